//! Reconcile Worker
//!
//! Drains the membership outbox: resolves missing ids, adds the member,
//! and reschedules failures with exponential backoff until
//! `max_attempts`, after which the entry is abandoned.

use chrono::Utc;
use proxy::domain::upstream::UpstreamApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::application::config::JoinRequestConfig;
use crate::application::membership::MembershipSteps;
use crate::domain::entity::PendingMembership;
use crate::domain::repository::MembershipOutbox;
use crate::error::{JoinRequestResult, MembershipStepError};

/// Counts from one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub done: usize,
    pub retried: usize,
    pub abandoned: usize,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.done == 0 && self.retried == 0 && self.abandoned == 0
    }
}

/// Reconcile Worker
pub struct ReconcileWorker<U, O>
where
    U: UpstreamApi,
    O: MembershipOutbox,
{
    steps: MembershipSteps<U>,
    outbox: Arc<O>,
    config: Arc<JoinRequestConfig>,
}

impl<U, O> ReconcileWorker<U, O>
where
    U: UpstreamApi + Send + Sync + 'static,
    O: MembershipOutbox + Send + Sync + 'static,
{
    pub fn new(upstream: Arc<U>, outbox: Arc<O>, config: Arc<JoinRequestConfig>) -> Self {
        Self {
            steps: MembershipSteps::new(upstream),
            outbox,
            config,
        }
    }

    /// Handle every entry that is due now
    pub async fn run_once(&self) -> JoinRequestResult<ReconcileReport> {
        let now = Utc::now();
        let entries = self.outbox.due(now, self.config.batch_size).await?;
        let mut report = ReconcileReport::default();

        for entry in entries {
            let Err(e) = self.attempt(&entry).await else {
                self.outbox.mark_done(entry.id).await?;
                tracing::info!(
                    entry_id = %entry.id,
                    join_request_id = %entry.join_request_id,
                    "Membership reconciled"
                );
                report.done += 1;
                continue;
            };

            let attempts = entry.attempts.saturating_add(1);
            if e.is_permanent() || attempts >= self.config.max_attempts {
                self.outbox.mark_abandoned(entry.id, &e.to_string()).await?;
                tracing::error!(
                    entry_id = %entry.id,
                    join_request_id = %entry.join_request_id,
                    attempts,
                    error = %e,
                    "Membership abandoned; user is approved but not a member"
                );
                report.abandoned += 1;
            } else {
                let delay = chrono::Duration::from_std(self.config.backoff(attempts))
                    .unwrap_or_else(|_| chrono::Duration::zero());
                let next_attempt_at = now + delay;
                self.outbox
                    .mark_failed(entry.id, &e.to_string(), next_attempt_at)
                    .await?;
                tracing::warn!(
                    entry_id = %entry.id,
                    join_request_id = %entry.join_request_id,
                    attempts,
                    next_attempt_at = %next_attempt_at,
                    error = %e,
                    "Membership retry failed"
                );
                report.retried += 1;
            }
        }

        Ok(report)
    }

    async fn attempt(&self, entry: &PendingMembership) -> Result<(), MembershipStepError> {
        let authorization = self.config.service_authorization();

        let target = match &entry.target {
            Some(target) => target.clone(),
            None => {
                self.steps
                    .resolve_target(&entry.join_request_id, authorization.clone())
                    .await?
            }
        };

        self.steps.add_member(&target, authorization).await
    }

    /// Run [`Self::run_once`] every `interval` on the tokio runtime
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok(report) if report.is_empty() => {}
                    Ok(report) => {
                        tracing::info!(
                            done = report.done,
                            retried = report.retried,
                            abandoned = report.abandoned,
                            "Outbox pass finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Outbox pass failed");
                    }
                }
            }
        })
    }
}
