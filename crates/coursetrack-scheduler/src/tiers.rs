//! Reminder tier window math.
//!
//! Pure functions from timestamps to an optional tier. The two-day windows
//! tolerate a tick that is skipped or delayed by up to one day; the ledger
//! keeps the resulting at-least-once emission down to at-most-once.

use chrono::{DateTime, Duration, Utc};

use coursetrack_core::model::{Account, CourseAssignment};
use coursetrack_core::traits::ReminderTier;

/// Hard cutoff: days after the due date.
pub const CUTOFF_DAYS: i64 = 30;

/// Final-notice lead: within 24 hours before the cutoff.
const FINAL_NOTICE_SECS: i64 = 86_400;

/// The hard cutoff instant for an assignment.
pub fn cutoff(due_date: DateTime<Utc>) -> DateTime<Utc> {
    due_date + Duration::days(CUTOFF_DAYS)
}

/// Whole days elapsed, truncated. Negative spans truncate toward zero.
fn floor_days(span: Duration) -> i64 {
    span.num_days()
}

/// Pre-activation tier for an account that has never activated.
///
/// `None` for activated accounts regardless of age.
pub fn pre_activation_tier(account: &Account, now: DateTime<Utc>) -> Option<ReminderTier> {
    if account.activated_at.is_some() {
        return None;
    }
    match floor_days(now - account.created_at) {
        7 | 8 => Some(ReminderTier::PreActivation7),
        15 | 16 => Some(ReminderTier::PreActivation15),
        _ => None,
    }
}

/// Overdue tier for an assignment that is not completed.
///
/// Callers exclude completed assignments before calling; this function only
/// sees the due date. The final notice fires in the last 24 hours before
/// the hard cutoff at `due_date + 30 days`.
pub fn overdue_tier(assignment: &CourseAssignment, now: DateTime<Utc>) -> Option<ReminderTier> {
    if now <= assignment.due_date {
        return None;
    }

    match floor_days(now - assignment.due_date) {
        7 | 8 => return Some(ReminderTier::Overdue7),
        15 | 16 => return Some(ReminderTier::Overdue15),
        _ => {}
    }

    let secs_until_cutoff = (cutoff(assignment.due_date) - now).num_seconds();
    if secs_until_cutoff > 0 && secs_until_cutoff <= FINAL_NOTICE_SECS {
        return Some(ReminderTier::FinalNotice);
    }

    None
}
