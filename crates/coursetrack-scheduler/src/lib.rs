//! coursetrack-scheduler — the day-offset reminder scheduler.
//!
//! One serialized daily pass over the account and assignment populations.
//! Tier windows live in [`tiers`], the at-most-once ledger in [`ledger`];
//! this module wires them to the store, clock, and notifier seams with
//! per-item error isolation.

pub mod ledger;
pub mod tiers;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coursetrack_core::classify;
use coursetrack_core::error::EngineError;
use coursetrack_core::model::{Account, ProgressRecord};
use coursetrack_core::traits::{deep_link, Clock, Notifier, ReminderNotice, ReminderTier, Store};

pub use crate::ledger::{ReminderKey, ReminderLedger};

/// One error collected during a tick. The tick itself still counts as run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickError {
    pub account_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub tier: Option<ReminderTier>,
    pub message: String,
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// The instant the tick evaluated against.
    pub started_at: DateTime<Utc>,
    /// Reminders delivered this tick.
    pub sent: Vec<ReminderNotice>,
    /// Per-item failures, none of which aborted the pass.
    pub errors: Vec<TickError>,
    pub accounts_scanned: usize,
    pub assignments_scanned: usize,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl TickOutcome {
    /// Save the outcome as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize outcome")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write outcome to {}", path.display()))?;
        Ok(())
    }

    /// Load an outcome from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read outcome from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse outcome JSON")
    }
}

/// The reminder scheduler.
///
/// Owns a ledger for the process lifetime; persistence across processes
/// goes through [`ReminderLedger::save_json`] / [`ReminderLedger::load_or_default`].
pub struct ReminderScheduler {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    ledger: ReminderLedger,
    base_url: String,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        ledger: ReminderLedger,
        base_url: &str,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            ledger,
            base_url: base_url.to_string(),
        }
    }

    pub fn ledger(&self) -> &ReminderLedger {
        &self.ledger
    }

    /// Run one serialized tick over the whole population.
    ///
    /// Fails only when the population reads themselves fail; everything
    /// per-item (tier decision, claim, send) is isolated and collected
    /// into the outcome.
    pub async fn run_tick(&self) -> Result<TickOutcome, EngineError> {
        let start = Instant::now();
        let now = self.clock.now();
        let run_id = Uuid::new_v4();

        let accounts = self.store.accounts().await?;
        let assignments = self.store.all_assignments().await?;
        let courses: HashMap<String, String> = self
            .store
            .courses()
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();
        let progress: HashMap<(String, String), ProgressRecord> = self
            .store
            .progress_records()
            .await?
            .into_iter()
            .map(|r| ((r.account_id.clone(), r.course_id.clone()), r))
            .collect();
        let accounts_by_id: HashMap<String, Account> =
            accounts.iter().map(|a| (a.id.clone(), a.clone())).collect();

        let mut sent = Vec::new();
        let mut errors = Vec::new();

        // Pre-activation pass.
        for account in &accounts {
            let Some(tier) = tiers::pre_activation_tier(account, now) else {
                continue;
            };
            let key = ReminderKey::account(&account.id, tier);
            let notice = ReminderNotice {
                tier,
                account_id: account.id.clone(),
                email: account.email.clone(),
                course_title: None,
                due_date: None,
                link: deep_link(&self.base_url, account),
            };
            self.deliver(key, notice, &mut sent, &mut errors).await;
        }

        // Overdue pass.
        for assignment in &assignments {
            let record = progress
                .get(&(assignment.account_id.clone(), assignment.course_id.clone()));
            // Completed assignments are excluded from every overdue tier.
            if classify::classify(assignment, record, now).status.is_completed() {
                continue;
            }
            let Some(tier) = tiers::overdue_tier(assignment, now) else {
                continue;
            };
            let Some(account) = accounts_by_id.get(&assignment.account_id) else {
                tracing::warn!(
                    account = %assignment.account_id,
                    course = %assignment.course_id,
                    "assignment references unknown account, skipping"
                );
                errors.push(TickError {
                    account_id: assignment.account_id.clone(),
                    course_id: Some(assignment.course_id.clone()),
                    tier: Some(tier),
                    message: "assignment references unknown account".into(),
                });
                continue;
            };

            let key = ReminderKey::assignment(&account.id, &assignment.course_id, tier);
            let notice = ReminderNotice {
                tier,
                account_id: account.id.clone(),
                email: account.email.clone(),
                course_title: Some(
                    courses
                        .get(&assignment.course_id)
                        .cloned()
                        .unwrap_or_else(|| assignment.course_id.clone()),
                ),
                due_date: Some(assignment.due_date),
                link: deep_link(&self.base_url, account),
            };
            self.deliver(key, notice, &mut sent, &mut errors).await;
        }

        let outcome = TickOutcome {
            run_id,
            started_at: now,
            sent,
            errors,
            accounts_scanned: accounts.len(),
            assignments_scanned: assignments.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            run_id = %outcome.run_id,
            sent = outcome.sent.len(),
            errors = outcome.errors.len(),
            accounts = outcome.accounts_scanned,
            assignments = outcome.assignments_scanned,
            "reminder tick complete"
        );

        Ok(outcome)
    }

    /// Claim, send, and on failure release the claim so a later tick in
    /// the same window can retry. All-or-nothing per item.
    async fn deliver(
        &self,
        key: ReminderKey,
        notice: ReminderNotice,
        sent: &mut Vec<ReminderNotice>,
        errors: &mut Vec<TickError>,
    ) {
        if !self.ledger.claim(&key) {
            tracing::debug!(
                account = %key.account_id,
                tier = %key.tier,
                "reminder already sent, skipping"
            );
            return;
        }

        match self.notifier.send(&notice).await {
            Ok(()) => sent.push(notice),
            Err(e) => {
                tracing::error!(
                    account = %key.account_id,
                    tier = %key.tier,
                    "reminder delivery failed: {e:#}"
                );
                self.ledger.release(&key);
                errors.push(TickError {
                    account_id: key.account_id,
                    course_id: key.course_id,
                    tier: Some(key.tier),
                    message: e.to_string(),
                });
            }
        }
    }
}
