//! The `coursetrack classify` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursetrack_core::classify::{AssignmentStatus, ClassifiedAssignment};
use coursetrack_core::engine::ProgressEngine;
use coursetrack_core::traits::Store;

use super::{build_clock, load_store};

pub async fn execute(
    roster_path: PathBuf,
    account: String,
    now: Option<String>,
    format: String,
) -> Result<()> {
    let (_, store) = load_store(&roster_path)?;
    let clock = build_clock(now.as_deref())?;
    let engine = ProgressEngine::new(store as Arc<dyn Store>, Arc::clone(&clock));

    let report = engine.classify_assignments_at(&account, clock.now()).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Course", "Status", "Progress", "Due", "Detail"]);
    for row in report
        .completed
        .iter()
        .chain(report.overdue.iter())
        .chain(report.todo.iter())
    {
        table.add_row(assignment_row(row));
    }
    println!("{table}");

    println!(
        "\n{} assignments: {} completed, {} overdue, {} todo ({:.2}% complete)",
        report.summary.total,
        report.summary.completed_count,
        report.summary.overdue_count,
        report.summary.todo_count,
        report.summary.completion_rate
    );

    Ok(())
}

fn assignment_row(a: &ClassifiedAssignment) -> Vec<Cell> {
    let (status, detail) = match a.status {
        AssignmentStatus::Completed { completed_at } => (
            "completed",
            format!("finished {}", completed_at.format("%Y-%m-%d")),
        ),
        AssignmentStatus::Overdue { days_overdue } => {
            ("overdue", format!("{days_overdue} day(s) overdue"))
        }
        AssignmentStatus::Todo { days_remaining } => {
            ("todo", format!("{days_remaining} day(s) remaining"))
        }
    };
    vec![
        Cell::new(&a.course_id),
        Cell::new(status),
        Cell::new(format!("{}%", a.percent)),
        Cell::new(a.due_date.format("%Y-%m-%d").to_string()),
        Cell::new(detail),
    ]
}
