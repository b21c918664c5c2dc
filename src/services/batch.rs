//! Bulk operation runner
//!
//! Bulk edits are a list of independent calls, one per selected item. A failing
//! item never stops the rest; every item gets an outcome and the report keeps
//! them in input order whatever the execution mode.

use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::utils::errors::ZapError;
use crate::utils::logging::log_batch_result;

/// How a batch issues its calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// One call at a time, in order
    Sequential,
    /// At most `limit` calls in flight
    Concurrent { limit: usize },
}

impl BatchMode {
    /// Mode for a configured concurrency, where 1 (or 0) means sequential
    pub fn from_concurrency(concurrency: usize) -> Self {
        if concurrency <= 1 {
            BatchMode::Sequential
        } else {
            BatchMode::Concurrent { limit: concurrency }
        }
    }

    fn limit(&self) -> usize {
        match self {
            BatchMode::Sequential => 1,
            BatchMode::Concurrent { limit } => (*limit).max(1),
        }
    }
}

/// Result of one item of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-item outcomes of a batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// One-line summary for operators
    pub fn summary(&self) -> String {
        if self.error_count() == 0 {
            format!("{} items updated", self.success_count())
        } else {
            format!("{} succeeded, {} failed", self.success_count(), self.error_count())
        }
    }
}

/// Run `op` once per id and collect every outcome
pub async fn run_batch<F, Fut>(operation: &str, ids: &[String], mode: BatchMode, op: F) -> BatchReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), ZapError>>,
{
    let outcomes: Vec<ItemOutcome> = stream::iter(ids.iter().cloned())
        .map(|id| {
            let call = op(id.clone());
            async move {
                match call.await {
                    Ok(()) => ItemOutcome { id, error: None },
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "Bulk item failed");
                        ItemOutcome { id, error: Some(e.user_message()) }
                    }
                }
            }
        })
        .buffered(mode.limit())
        .collect()
        .await;

    let report = BatchReport { outcomes };
    log_batch_result(operation, report.success_count(), report.error_count());
    report
}
