// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::Deserialize;
use tower::BoxError;

use crate::exporters::blackhole::BlackholeSink;
use crate::exporters::directory::DirectorySink;
use crate::exporters::http::{HttpSink, HttpSinkConfig};
use crate::exporters::sink::SinkKind;
use crate::init::batch_output::BatchFormat;

#[derive(Copy, Clone, Debug, Default, ValueEnum, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkArg {
    /// Discard batches
    #[default]
    Blackhole,
    /// Copy batches into a spool directory
    Directory,
    /// PUT batches to an HTTP endpoint
    Http,
}

#[derive(Debug, Args, Clone, Deserialize)]
#[serde(default)]
pub struct SinkArgs {
    /// Where finished batches go
    #[arg(value_enum, long, env = "LOGCAPTURE_SINK", default_value = "blackhole")]
    pub sink: SinkArg,

    /// Spool directory for the directory sink
    #[arg(long, env = "LOGCAPTURE_SINK_DIR", default_value = "spool")]
    #[serde(rename = "dir")]
    pub sink_dir: PathBuf,

    /// Base URL for the http sink (e.g., http://collector:8080/batches)
    #[arg(long, env = "LOGCAPTURE_SINK_ENDPOINT")]
    #[serde(rename = "endpoint")]
    pub sink_endpoint: Option<String>,

    /// Upload timeout for the http sink
    #[arg(
        long,
        env = "LOGCAPTURE_SINK_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    #[serde(rename = "timeout", with = "humantime_serde")]
    pub sink_timeout: Duration,
}

impl Default for SinkArgs {
    fn default() -> Self {
        SinkArgs {
            sink: SinkArg::Blackhole,
            sink_dir: PathBuf::from("spool"),
            sink_endpoint: None,
            sink_timeout: Duration::from_secs(10),
        }
    }
}

impl SinkArgs {
    /// Build the configured sink. Batches of `format` set the upload content type.
    pub fn build(&self, format: BatchFormat) -> Result<SinkKind, BoxError> {
        match self.sink {
            SinkArg::Blackhole => Ok(SinkKind::Blackhole(BlackholeSink::new())),
            SinkArg::Directory => Ok(SinkKind::Directory(DirectorySink::new(
                self.sink_dir.clone(),
            ))),
            SinkArg::Http => {
                let endpoint = self
                    .sink_endpoint
                    .as_deref()
                    .ok_or("--sink-endpoint is required for the http sink")?;
                let content_type = match format {
                    BatchFormat::Csv => "text/csv",
                    BatchFormat::Json => "application/x-ndjson",
                };
                let config = HttpSinkConfig::new(endpoint, self.sink_timeout)
                    .with_content_type(content_type);
                Ok(SinkKind::Http(HttpSink::new(config)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blackhole() {
        let sink = SinkArgs::default().build(BatchFormat::Csv).unwrap();
        assert!(matches!(sink, SinkKind::Blackhole(_)));
    }

    #[test]
    fn test_directory_sink() {
        let args = SinkArgs {
            sink: SinkArg::Directory,
            sink_dir: PathBuf::from("/tmp/outbox"),
            ..Default::default()
        };
        let SinkKind::Directory(sink) = args.build(BatchFormat::Csv).unwrap() else {
            panic!("expected directory sink");
        };
        assert_eq!(sink.dir(), PathBuf::from("/tmp/outbox"));
    }

    #[test]
    fn test_http_needs_endpoint() {
        let args = SinkArgs {
            sink: SinkArg::Http,
            ..Default::default()
        };
        let err = args.build(BatchFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("--sink-endpoint"));
    }

    #[test]
    fn test_http_rejects_bad_endpoint() {
        let args = SinkArgs {
            sink: SinkArg::Http,
            sink_endpoint: Some("ftp://collector/batches".to_string()),
            ..Default::default()
        };
        assert!(args.build(BatchFormat::Csv).is_err());
    }

    #[test]
    fn test_http_sink() {
        let args = SinkArgs {
            sink: SinkArg::Http,
            sink_endpoint: Some("http://collector:8080/batches".to_string()),
            ..Default::default()
        };
        let SinkKind::Http(sink) = args.build(BatchFormat::Json).unwrap() else {
            panic!("expected http sink");
        };
        assert_eq!(
            sink.url_for(std::path::Path::new("out/hrtrtf.csv")),
            "http://collector:8080/batches/hrtrtf.csv"
        );
    }

    #[test]
    fn test_deserialize() {
        let args: SinkArgs = serde_json::from_str(
            r#"{"sink":"http","endpoint":"http://localhost:9000","timeout":"2m 30s"}"#,
        )
        .unwrap();
        assert_eq!(args.sink, SinkArg::Http);
        assert_eq!(args.sink_endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(args.sink_timeout, Duration::from_secs(150));
        assert_eq!(args.sink_dir, PathBuf::from("spool"));
    }
}
