//! Population-wide dashboard snapshot with month-over-month deltas.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use coursetrack_core::classify;
use coursetrack_core::error::EngineError;
use coursetrack_core::model::ProgressRecord;
use coursetrack_core::traits::{Clock, Store};

/// One aggregated view of the population at an instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: Option<DateTime<Utc>>,
    pub total_accounts: usize,
    /// Accounts that have activated at least once.
    pub active_accounts: usize,
    pub course_count: usize,
    pub assignment_count: usize,
    /// Mean progress percentage across all assignments, 2 decimals.
    /// Assignments without a progress record count as 0.
    pub average_completion: f64,
    pub completed_count: usize,
    pub overdue_count: usize,
    pub todo_count: usize,
    /// Courses ranked by completion count, best first.
    pub top_courses: Vec<CourseRanking>,
    /// Accounts ranked by attempt count, most active first.
    pub most_active: Vec<AccountRanking>,
    /// Month-over-month percentage deltas against the previous calendar month.
    pub deltas: MonthOverMonth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRanking {
    pub course_id: String,
    pub title: String,
    pub completions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRanking {
    pub account_id: String,
    pub name: String,
    pub attempts: usize,
}

/// `(current - previous) / previous * 100`, defined as 0 when the previous
/// month had nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthOverMonth {
    pub attempts_pct: f64,
    pub completions_pct: f64,
    pub active_accounts_pct: f64,
}

const RANKING_LIMIT: usize = 5;

/// Read-side aggregator over the store.
pub struct DashboardAggregator {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl DashboardAggregator {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Build a snapshot. Store failures degrade to an empty snapshot with
    /// a warning; the dashboard is never the reason an operation fails.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        match self.try_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("dashboard aggregation failed, returning empty snapshot: {e}");
                DashboardSnapshot::default()
            }
        }
    }

    async fn try_snapshot(&self) -> Result<DashboardSnapshot, EngineError> {
        let now = self.clock.now();
        let accounts = self.store.accounts().await?;
        let courses = self.store.courses().await?;
        let assignments = self.store.all_assignments().await?;
        let records = self.store.progress_records().await?;
        let attempts = self.store.attempts().await?;

        let progress_by_pair: HashMap<(String, String), ProgressRecord> = records
            .iter()
            .map(|r| ((r.account_id.clone(), r.course_id.clone()), r.clone()))
            .collect();

        let mut completed_count = 0usize;
        let mut overdue_count = 0usize;
        let mut todo_count = 0usize;
        let mut percent_sum = 0u64;
        for assignment in &assignments {
            let record = progress_by_pair
                .get(&(assignment.account_id.clone(), assignment.course_id.clone()));
            let classified = classify::classify(assignment, record, now);
            percent_sum += classified.percent as u64;
            if classified.status.is_completed() {
                completed_count += 1;
            } else if classified.status.is_overdue() {
                overdue_count += 1;
            } else {
                todo_count += 1;
            }
        }

        let average_completion = if assignments.is_empty() {
            0.0
        } else {
            round2(percent_sum as f64 / assignments.len() as f64)
        };

        // Completion counts per course for the ranking.
        let mut completions_per_course: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            if record.completed {
                *completions_per_course
                    .entry(record.course_id.as_str())
                    .or_default() += 1;
            }
        }
        let mut top_courses: Vec<CourseRanking> = courses
            .iter()
            .map(|c| CourseRanking {
                course_id: c.id.clone(),
                title: c.title.clone(),
                completions: completions_per_course.get(c.id.as_str()).copied().unwrap_or(0),
            })
            .collect();
        top_courses.sort_by(|a, b| {
            b.completions
                .cmp(&a.completions)
                .then_with(|| a.course_id.cmp(&b.course_id))
        });
        top_courses.truncate(RANKING_LIMIT);

        // Attempt counts per account for the ranking.
        let mut attempts_per_account: HashMap<&str, usize> = HashMap::new();
        for attempt in &attempts {
            *attempts_per_account
                .entry(attempt.account_id.as_str())
                .or_default() += 1;
        }
        let mut most_active: Vec<AccountRanking> = accounts
            .iter()
            .filter_map(|a| {
                let n = attempts_per_account.get(a.id.as_str()).copied().unwrap_or(0);
                (n > 0).then(|| AccountRanking {
                    account_id: a.id.clone(),
                    name: a.name.clone(),
                    attempts: n,
                })
            })
            .collect();
        most_active.sort_by(|a, b| {
            b.attempts
                .cmp(&a.attempts)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });
        most_active.truncate(RANKING_LIMIT);

        // Month-over-month deltas on attempt, completion, and activation
        // activity, bucketed by calendar month.
        let cur_start = month_start(now);
        let prev_start = previous_month_start(now);
        let in_window = |t: DateTime<Utc>, from: DateTime<Utc>, to: DateTime<Utc>| t >= from && t < to;

        let attempts_cur = attempts
            .iter()
            .filter(|a| in_window(a.submitted_at, cur_start, now))
            .count();
        let attempts_prev = attempts
            .iter()
            .filter(|a| in_window(a.submitted_at, prev_start, cur_start))
            .count();

        let completions_cur = records
            .iter()
            .filter(|r| r.completed && in_window(r.updated_at, cur_start, now))
            .count();
        let completions_prev = records
            .iter()
            .filter(|r| r.completed && in_window(r.updated_at, prev_start, cur_start))
            .count();

        let active_cur = accounts
            .iter()
            .filter(|a| a.activated_at.is_some_and(|t| in_window(t, cur_start, now)))
            .count();
        let active_prev = accounts
            .iter()
            .filter(|a| {
                a.activated_at
                    .is_some_and(|t| in_window(t, prev_start, cur_start))
            })
            .count();

        Ok(DashboardSnapshot {
            generated_at: Some(now),
            total_accounts: accounts.len(),
            active_accounts: accounts.iter().filter(|a| a.activated_at.is_some()).count(),
            course_count: courses.len(),
            assignment_count: assignments.len(),
            average_completion,
            completed_count,
            overdue_count,
            todo_count,
            top_courses,
            most_active,
            deltas: MonthOverMonth {
                attempts_pct: pct_delta(attempts_cur, attempts_prev),
                completions_pct: pct_delta(completions_cur, completions_prev),
                active_accounts_pct: pct_delta(active_cur, active_prev),
            },
        })
    }
}

/// Percentage change from `previous` to `current`, 0 when `previous == 0`.
pub fn pct_delta(current: usize, previous: usize) -> f64 {
    if previous == 0 {
        0.0
    } else {
        round2((current as f64 - previous as f64) / previous as f64 * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn previous_month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

impl DashboardSnapshot {
    /// Save the snapshot as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize snapshot")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        Ok(())
    }

    /// Format the snapshot as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Population:** {} accounts ({} active) | {} courses | {} assignments\n\n",
            self.total_accounts, self.active_accounts, self.course_count, self.assignment_count
        ));
        md.push_str(&format!(
            "**Assignments:** {} completed, {} overdue, {} todo | average completion {:.2}%\n\n",
            self.completed_count, self.overdue_count, self.todo_count, self.average_completion
        ));
        md.push_str(&format!(
            "**Month over month:** attempts {:+.2}%, completions {:+.2}%, activations {:+.2}%\n\n",
            self.deltas.attempts_pct, self.deltas.completions_pct, self.deltas.active_accounts_pct
        ));

        if !self.top_courses.is_empty() {
            md.push_str("### Top courses\n\n");
            md.push_str("| Course | Completions |\n");
            md.push_str("|--------|-------------|\n");
            for course in &self.top_courses {
                md.push_str(&format!("| {} | {} |\n", course.title, course.completions));
            }
            md.push('\n');
        }

        if !self.most_active.is_empty() {
            md.push_str("### Most active learners\n\n");
            md.push_str("| Learner | Attempts |\n");
            md.push_str("|---------|----------|\n");
            for account in &self.most_active {
                md.push_str(&format!("| {} | {} |\n", account.name, account.attempts));
            }
        }

        md
    }
}
