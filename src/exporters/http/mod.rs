// SPDX-License-Identifier: Apache-2.0

//! HTTP sink: uploads each batch with `PUT <endpoint>/<file name>`.

mod client;

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use tower::BoxError;
use tracing::{debug, info};

use crate::exporters::http::client::{ConnectError, build_hyper_client};
use crate::exporters::sink::{Sink, SinkError};

/// Configuration for the HTTP sink
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    /// Base URL; the batch file name is appended as the last path segment
    pub endpoint: String,
    /// Upper bound for one upload, including connect
    pub timeout: Duration,
    pub content_type: String,
}

impl HttpSinkConfig {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            content_type: "text/csv".to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

pub struct HttpSink {
    client: HyperClient<HttpConnector, Full<Bytes>>,
    endpoint: String,
    timeout: Duration,
    content_type: String,
}

impl HttpSink {
    pub fn new(config: HttpSinkConfig) -> Result<Self, SinkError> {
        let uri: Uri = config
            .endpoint
            .parse()
            .map_err(|e| SinkError::Config(format!("invalid endpoint {}: {}", config.endpoint, e)))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(SinkError::Config(format!(
                "endpoint must be an http:// URL: {}",
                config.endpoint
            )));
        }
        if config.timeout.is_zero() {
            return Err(SinkError::Config("timeout must be positive".to_string()));
        }

        Ok(Self {
            client: build_hyper_client(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            content_type: config.content_type,
        })
    }

    /// Destination URL for an artifact
    pub fn url_for(&self, artifact: &Path) -> String {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{}", self.endpoint, name)
    }

    async fn upload(&self, url: &str, body: Vec<u8>) -> Result<u16, BoxError> {
        let req = Request::builder()
            .method(Method::PUT)
            .uri(url)
            .header(CONTENT_TYPE, self.content_type.as_str())
            .body(Full::new(Bytes::from(body)))?;

        let resp = match self.client.request(req).await {
            Ok(resp) => resp,
            Err(e) if e.is_connect() => return Err(ConnectError.into()),
            Err(e) => return Err(e.into()),
        };

        let status = resp.status();
        // Drain so the connection can be reused
        let _ = resp.into_body().collect().await;
        Ok(status.as_u16())
    }
}

impl Sink for HttpSink {
    async fn push(&self, artifact: &Path) -> Result<(), SinkError> {
        let path = artifact.to_path_buf();
        let body = tokio::fs::read(artifact)
            .await
            .map_err(|source| SinkError::Read {
                path: path.clone(),
                source,
            })?;

        let url = self.url_for(artifact);
        debug!(url = %url, bytes = body.len(), "Uploading batch");

        let status = match tokio::time::timeout(self.timeout, self.upload(&url, body)).await {
            Err(_) => return Err(SinkError::Timeout { path }),
            Ok(Err(e)) => {
                return Err(SinkError::Request {
                    path,
                    reason: e.to_string(),
                });
            }
            Ok(Ok(status)) => status,
        };

        if !(200..300).contains(&status) {
            return Err(SinkError::Rejected { path, status });
        }

        info!(url = %url, status, "Uploaded batch");
        Ok(())
    }
}

impl std::fmt::Debug for HttpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSink")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accept one request, answer with `status`, and hand back the raw request.
    async fn one_shot_server(status: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
        });

        (format!("http://{}/batches", addr), rx)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..head_end]
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= head_end + 4 + length
    }

    fn batch_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("hrtrtf.csv");
        std::fs::write(&path, "Date,Time\n2012-02-15,07:04:42\n").unwrap();
        path
    }

    #[tokio::test]
    async fn test_put_batch() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = batch_file(&dir);
        let (endpoint, request) = one_shot_server("201 Created").await;

        let sink = HttpSink::new(HttpSinkConfig::new(endpoint, Duration::from_secs(5))).unwrap();
        sink.push(&artifact).await.unwrap();

        let request = request.await.unwrap();
        assert!(request.starts_with("PUT /batches/hrtrtf.csv HTTP/1.1\r\n"));
        assert!(request.to_lowercase().contains("content-type: text/csv"));
        assert!(request.ends_with("Date,Time\n2012-02-15,07:04:42\n"));
    }

    #[tokio::test]
    async fn test_non_success_is_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = batch_file(&dir);
        let (endpoint, _request) = one_shot_server("500 Internal Server Error").await;

        let sink = HttpSink::new(HttpSinkConfig::new(endpoint, Duration::from_secs(5))).unwrap();
        let err = sink.push(&artifact).await.unwrap_err();
        assert!(matches!(err, SinkError::Rejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = batch_file(&dir);

        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = HttpSink::new(HttpSinkConfig::new(
            format!("http://{}", addr),
            Duration::from_secs(5),
        ))
        .unwrap();
        let err = sink.push(&artifact).await.unwrap_err();
        assert!(matches!(err, SinkError::Request { .. }));
    }

    #[test]
    fn test_config_validation() {
        let timeout = Duration::from_secs(1);
        assert!(HttpSink::new(HttpSinkConfig::new("not a url", timeout)).is_err());
        assert!(HttpSink::new(HttpSinkConfig::new("https://example.com", timeout)).is_err());
        assert!(HttpSink::new(HttpSinkConfig::new("http://example.com", Duration::ZERO)).is_err());
    }

    #[test]
    fn test_url_for() {
        let sink = HttpSink::new(HttpSinkConfig::new(
            "http://example.com/upload/",
            Duration::from_secs(1),
        ))
        .unwrap();
        assert_eq!(
            sink.url_for(Path::new("/tmp/hrtrtf.csv")),
            "http://example.com/upload/hrtrtf.csv"
        );
    }
}
