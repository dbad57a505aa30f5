//! Run orchestration
//!
//! One run walks through a fixed sequence of stages:
//!
//! ```text
//! Fetching ──▶ Formatting ──▶ Publishing ──▶ Done
//!    │             │               │
//!    └─────────────┴───────────────┴──▶ Failed
//! ```
//!
//! - A fetch error or a stale measurement ends the run before anything is
//!   published.
//! - Publishing fans out to every target. Each target yields its own
//!   [`PublishResult`]; an error or even a panic inside one target is recorded
//!   and the remaining targets are still attempted.
//! - The run is successful only if every stage and every target succeeded.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, error, info, instrument};

use crate::fetcher::TemperatureSource;
use crate::formatter::{MessageTemplate, format_message};
use crate::publish::{PublishResult, PublishTarget};

pub const NO_TARGETS_DETAIL: &str = "no publish targets configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Fetching,
    Formatting,
    Publishing,
    Done,
    Failed,
}

/// Aggregated result of one run
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeReport {
    /// `Done` or `Failed`
    pub stage: RunStage,

    /// The stage that failed, if any
    pub failed_at: Option<RunStage>,

    pub success: bool,

    /// Single error string, or newline-joined per-target failures
    pub detail: String,

    /// The message that was (or would have been) published
    pub message: Option<String>,

    /// One entry per attempted target
    pub results: Vec<PublishResult>,
}

impl OutcomeReport {
    pub fn failed(stage: RunStage, detail: impl ToString) -> Self {
        Self {
            stage: RunStage::Failed,
            failed_at: Some(stage),
            success: false,
            detail: detail.to_string(),
            message: None,
            results: Vec::new(),
        }
    }

    /// Aggregates the per-target results of the publishing stage.
    pub fn from_results(message: String, results: Vec<PublishResult>) -> Self {
        if results.is_empty() {
            return Self {
                message: Some(message),
                ..Self::failed(RunStage::Publishing, NO_TARGETS_DETAIL)
            };
        }

        let success = results.iter().all(|result| result.success);
        let detail = results
            .iter()
            .filter(|result| !result.detail.is_empty())
            .map(|result| format!("{}: {}", result.target, result.detail))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            stage: if success {
                RunStage::Done
            } else {
                RunStage::Failed
            },
            failed_at: (!success).then_some(RunStage::Publishing),
            success,
            detail,
            message: Some(message),
            results,
        }
    }
}

pub struct Orchestrator {
    source: Box<dyn TemperatureSource>,
    targets: Vec<Box<dyn PublishTarget>>,
    template: MessageTemplate,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn TemperatureSource>,
        targets: Vec<Box<dyn PublishTarget>>,
        template: MessageTemplate,
    ) -> Self {
        Self {
            source,
            targets,
            template,
        }
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|target| target.name()).collect()
    }

    /// Runs fetch → format → publish, judging freshness against the wall clock.
    pub async fn run(&self) -> OutcomeReport {
        self.execute(Utc::now).await
    }

    /// Same as [`Orchestrator::run`], with a fixed "now".
    pub async fn run_at(&self, now: DateTime<Utc>) -> OutcomeReport {
        self.execute(|| now).await
    }

    #[instrument(skip_all)]
    async fn execute<F>(&self, now: F) -> OutcomeReport
    where
        F: Fn() -> DateTime<Utc>,
    {
        debug!("stage: {:?}", RunStage::Fetching);
        let measurement = match self.source.fetch().await {
            Ok(measurement) => measurement,
            Err(e) => {
                error!("Couldn't retrieve temp/time from api: {e}");
                return OutcomeReport::failed(RunStage::Fetching, e);
            }
        };
        debug!(
            "Successfully extracted time/temp from api ({} {})",
            measurement.timestamp, measurement.temperature
        );

        debug!("stage: {:?}", RunStage::Formatting);
        let message = match format_message(
            measurement.temperature,
            measurement.timestamp,
            now(),
            &self.template,
        ) {
            Ok(message) => message,
            Err(e) => {
                error!("refusing to publish: {e}");
                return OutcomeReport::failed(RunStage::Formatting, e);
            }
        };

        debug!("stage: {:?}", RunStage::Publishing);
        let results = self.publish_all(&message).await;
        let report = OutcomeReport::from_results(message, results);

        if report.success {
            info!("published to {} target(s)", report.results.len());
        } else {
            error!("publishing failed:\n{}", report.detail);
        }

        report
    }

    async fn publish_all(&self, message: &str) -> Vec<PublishResult> {
        let mut results = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let name = target.name();
            let outcome = AssertUnwindSafe(target.publish(message))
                .catch_unwind()
                .await;

            let result = match outcome {
                Ok(Ok(())) => {
                    debug!("{name}: published");
                    PublishResult::succeeded(name)
                }
                Ok(Err(e)) => {
                    error!("{name}: {e}");
                    PublishResult::failed(name, e)
                }
                Err(panic) => {
                    let detail = format!("unexpected error: {}", panic_message(panic.as_ref()));
                    error!("{name}: {detail}");
                    PublishResult::failed(name, detail)
                }
            };
            results.push(result);
        }

        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic without message".to_string()
    }
}
