//! Collaborator trait seams: storage, notification, and time.
//!
//! These traits are implemented by the `coursetrack-providers` crate and
//! consumed by the engine, scheduler, and dashboard. Everything the core
//! needs from the outside world passes through them, which keeps the
//! day-offset rules deterministic under test.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::error::EngineError;
use crate::model::{Account, Course, CourseAssignment, ProgressRecord, QuizAttempt};

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistent storage for courses, accounts, assignments, progress, and
/// quiz attempts.
///
/// Reads that enumerate populations return whole collections so callers can
/// join in memory by id sets instead of issuing per-item queries.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one course with its current content. `NotFound` if unknown.
    async fn course(&self, course_id: &str) -> Result<Course, EngineError>;

    /// All courses.
    async fn courses(&self) -> Result<Vec<Course>, EngineError>;

    /// Fetch one account. `NotFound` if unknown.
    async fn account(&self, account_id: &str) -> Result<Account, EngineError>;

    /// All accounts.
    async fn accounts(&self) -> Result<Vec<Account>, EngineError>;

    /// Progress for one (account, course) pair, `None` before the first
    /// completion event.
    async fn progress(
        &self,
        account_id: &str,
        course_id: &str,
    ) -> Result<Option<ProgressRecord>, EngineError>;

    /// All progress records.
    async fn progress_records(&self) -> Result<Vec<ProgressRecord>, EngineError>;

    /// Upsert a progress record.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), EngineError>;

    /// Assignments for one account.
    async fn assignments_for_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<CourseAssignment>, EngineError>;

    /// Every assignment across the population.
    async fn all_assignments(&self) -> Result<Vec<CourseAssignment>, EngineError>;

    /// Append one quiz attempt to the log.
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<(), EngineError>;

    /// The full attempt log.
    async fn attempts(&self) -> Result<Vec<QuizAttempt>, EngineError>;
}

// ---------------------------------------------------------------------------
// Notifier trait
// ---------------------------------------------------------------------------

/// A reminder rule keyed to a day-offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderTier {
    /// Account created 7–8 days ago and never activated.
    #[serde(rename = "pre-activation-7")]
    PreActivation7,
    /// Account created 15–16 days ago and never activated.
    #[serde(rename = "pre-activation-15")]
    PreActivation15,
    /// Assignment 7–8 days past due.
    #[serde(rename = "overdue-7")]
    Overdue7,
    /// Assignment 15–16 days past due.
    #[serde(rename = "overdue-15")]
    Overdue15,
    /// Within 24 hours of the hard cutoff at due date + 30 days.
    FinalNotice,
}

impl ReminderTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderTier::PreActivation7 => "pre-activation-7",
            ReminderTier::PreActivation15 => "pre-activation-15",
            ReminderTier::Overdue7 => "overdue-7",
            ReminderTier::Overdue15 => "overdue-15",
            ReminderTier::FinalNotice => "final-notice",
        }
    }
}

impl fmt::Display for ReminderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reminder to deliver. Carries everything the transport needs; the
/// scheduler never reaches back into the store from inside a send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderNotice {
    pub tier: ReminderTier,
    pub account_id: String,
    pub email: String,
    /// Course title, present for assignment-scoped tiers.
    #[serde(default)]
    pub course_title: Option<String>,
    /// Due date, present for assignment-scoped tiers.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Deep link into the application, built from an explicit base URL.
    pub link: String,
}

/// Outbound reminder delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable transport name (e.g. "webhook").
    fn name(&self) -> &str;

    /// Deliver one reminder. Fire-and-forget from the scheduler's
    /// perspective, but the outcome feeds error collection.
    async fn send(&self, notice: &ReminderNotice) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Clock trait
// ---------------------------------------------------------------------------

/// Source of "now". Injectable so the day-offset rules are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests and `--now` overrides.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Deep links
// ---------------------------------------------------------------------------

/// Build the deep link for an account from an explicitly passed base URL.
///
/// Accounts that never set a password get the signup link; everyone else
/// gets the login link. The base URL is always a parameter — never read
/// from process-wide state.
pub fn deep_link(base_url: &str, account: &Account) -> String {
    let base = base_url.trim_end_matches('/');
    if account.has_password {
        format!("{base}/login")
    } else {
        format!("{base}/signup?account={}", account.id)
    }
}
