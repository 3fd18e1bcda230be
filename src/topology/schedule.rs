// SPDX-License-Identifier: Apache-2.0

//! Drives capture cycles on a schedule.
//!
//! A failed cycle ends the schedule; nothing is retried here.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Timelike};
use tokio::select;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::exporters::sink::Sink;
use crate::receivers::file::persistence::OffsetStore;
use crate::topology::worker::{CaptureJob, CaptureWorker, CycleError, CycleOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A single cycle, right away
    Once,
    /// Cycles every `period`, the first after `first_delay`. Ticks are at a
    /// fixed rate: a slow cycle does not push later ticks back.
    FixedRate {
        period: Duration,
        first_delay: Duration,
    },
}

impl Schedule {
    /// Fixed rate schedule whose first cycle starts on the next whole minute.
    pub fn aligned<Tz: TimeZone>(period: Duration, now: &DateTime<Tz>) -> Self {
        let into_minute =
            Duration::from_secs(u64::from(now.second())) + Duration::from_nanos(u64::from(now.nanosecond()));
        Schedule::FixedRate {
            period,
            first_delay: Duration::from_secs(60).saturating_sub(into_minute),
        }
    }
}

/// Totals for a finished schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub cycles: u64,
    pub shipped: u64,
}

impl ScheduleSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        if !matches!(outcome, CycleOutcome::NoGrowth) {
            self.shipped += 1;
        }
    }
}

/// Run cycles until the schedule is done, a cycle fails, or `cancel` fires.
pub async fn run<S: Sink, O: OffsetStore>(
    worker: &CaptureWorker<S, O>,
    job: &CaptureJob,
    schedule: Schedule,
    cancel: CancellationToken,
) -> Result<ScheduleSummary, CycleError> {
    let mut summary = ScheduleSummary::default();

    let (period, first_delay) = match schedule {
        Schedule::Once => {
            let outcome = cycle(worker, job).await?;
            summary.record(&outcome);
            return Ok(summary);
        }
        Schedule::FixedRate {
            period,
            first_delay,
        } => (period, first_delay),
    };

    info!(
        source = %job.source.display(),
        worker = %worker.kind(),
        period_secs = period.as_secs_f64(),
        first_delay_secs = first_delay.as_secs_f64(),
        "Capture scheduled"
    );

    let mut timer = interval_at(Instant::now() + first_delay, period);
    loop {
        select! {
            biased;

            _ = cancel.cancelled() => {
                info!(cycles = summary.cycles, "Capture schedule cancelled");
                return Ok(summary);
            }

            _ = timer.tick() => {
                let outcome = cycle(worker, job).await?;
                summary.record(&outcome);
            }
        }
    }
}

async fn cycle<S: Sink, O: OffsetStore>(
    worker: &CaptureWorker<S, O>,
    job: &CaptureJob,
) -> Result<CycleOutcome, CycleError> {
    match worker.execute(job).await {
        Ok(outcome) => {
            match &outcome {
                CycleOutcome::NoGrowth => {}
                CycleOutcome::Tailed { extract } => {
                    info!(extract = %extract.display(), "Cycle complete")
                }
                CycleOutcome::Shipped { batch, stats, .. } => {
                    info!(
                        batch = %batch.display(),
                        records = stats.accepted,
                        rejected = stats.rejected,
                        "Cycle complete"
                    )
                }
            }
            Ok(outcome)
        }
        Err(e) => {
            error!(source = %job.source.display(), error = %e, "Worker failed, stopping schedule");
            Err(e)
        }
    }
}
