//! Due-date classification of course assignments.
//!
//! Classification is pure: one assignment, one optional progress record,
//! one instant. The engine feeds it batched store reads; the scheduler
//! uses it to keep completed assignments out of the overdue tiers.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CourseAssignment, ProgressRecord};

const MS_PER_DAY: i64 = 86_400_000;

/// The bucket an assignment falls into at evaluation time. Exactly one
/// holds; predicates are evaluated completed, then overdue, then todo, so
/// a finished assignment is never reported overdue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum AssignmentStatus {
    Completed {
        /// Timestamp of the last progress mutation.
        completed_at: DateTime<Utc>,
    },
    Overdue {
        /// `ceil((now - due_date) / 1 day)`, so one second past due
        /// already counts as one day overdue.
        days_overdue: i64,
    },
    Todo {
        /// `ceil((due_date - now) / 1 day)`; zero exactly at the due date.
        days_remaining: i64,
    },
}

impl AssignmentStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, AssignmentStatus::Completed { .. })
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, AssignmentStatus::Overdue { .. })
    }
}

/// One assignment joined with its progress and classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedAssignment {
    pub account_id: String,
    pub course_id: String,
    pub due_date: DateTime<Utc>,
    /// 0 when no progress record exists yet.
    pub percent: u8,
    pub status: AssignmentStatus,
}

/// Bucketed view of one learner's assignment list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub completed: Vec<ClassifiedAssignment>,
    pub overdue: Vec<ClassifiedAssignment>,
    pub todo: Vec<ClassifiedAssignment>,
    pub summary: ClassificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub total: usize,
    pub completed_count: usize,
    pub overdue_count: usize,
    pub todo_count: usize,
    /// `100 * completed / total` rounded to 2 decimals, 0 for an empty list.
    pub completion_rate: f64,
}

/// Whole days covered by `span`, rounding any partial day up. Non-positive
/// spans count as zero.
fn ceil_days(span: Duration) -> i64 {
    let ms = span.num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + MS_PER_DAY - 1) / MS_PER_DAY
    }
}

/// Classify one assignment against its progress record at `now`.
pub fn classify(
    assignment: &CourseAssignment,
    progress: Option<&ProgressRecord>,
    now: DateTime<Utc>,
) -> ClassifiedAssignment {
    let percent = progress.map(|p| p.percent).unwrap_or(0);

    let status = if percent >= 100 {
        // Completed wins even when the due date has passed.
        let completed_at = progress
            .map(|p| p.updated_at)
            .unwrap_or(assignment.assigned_at);
        AssignmentStatus::Completed { completed_at }
    } else if assignment.due_date < now {
        AssignmentStatus::Overdue {
            days_overdue: ceil_days(now - assignment.due_date),
        }
    } else {
        AssignmentStatus::Todo {
            days_remaining: ceil_days(assignment.due_date - now),
        }
    };

    ClassifiedAssignment {
        account_id: assignment.account_id.clone(),
        course_id: assignment.course_id.clone(),
        due_date: assignment.due_date,
        percent,
        status,
    }
}

/// Bucket a learner's full assignment list. `progress_by_course` carries the
/// learner's records keyed by course id; absent entries mean 0% progress.
pub fn classify_all(
    assignments: &[CourseAssignment],
    progress_by_course: &HashMap<String, ProgressRecord>,
    now: DateTime<Utc>,
) -> ClassificationReport {
    let mut report = ClassificationReport::default();

    for assignment in assignments {
        let classified = classify(
            assignment,
            progress_by_course.get(&assignment.course_id),
            now,
        );
        match classified.status {
            AssignmentStatus::Completed { .. } => report.completed.push(classified),
            AssignmentStatus::Overdue { .. } => report.overdue.push(classified),
            AssignmentStatus::Todo { .. } => report.todo.push(classified),
        }
    }

    let total = assignments.len();
    let completed_count = report.completed.len();
    report.summary = ClassificationSummary {
        total,
        completed_count,
        overdue_count: report.overdue.len(),
        todo_count: report.todo.len(),
        completion_rate: if total == 0 {
            0.0
        } else {
            round2(100.0 * completed_count as f64 / total as f64)
        },
    };
    report
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
