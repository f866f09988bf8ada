//! The `coursetrack dashboard` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursetrack_core::traits::Store;
use coursetrack_report::DashboardAggregator;

use super::{build_clock, load_store};

pub async fn execute(
    roster_path: PathBuf,
    now: Option<String>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let (_, store) = load_store(&roster_path)?;
    let clock = build_clock(now.as_deref())?;
    let aggregator = DashboardAggregator::new(store as Arc<dyn Store>, clock);

    let snapshot = aggregator.snapshot().await;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        "markdown" => println!("{}", snapshot.to_markdown()),
        _ => {
            let mut table = Table::new();
            table.set_header(vec!["Metric", "Value", "MoM"]);
            table.add_row(vec![
                Cell::new("Accounts (active)"),
                Cell::new(format!(
                    "{} ({})",
                    snapshot.total_accounts, snapshot.active_accounts
                )),
                Cell::new(format!("{:+.2}%", snapshot.deltas.active_accounts_pct)),
            ]);
            table.add_row(vec![
                Cell::new("Courses"),
                Cell::new(snapshot.course_count),
                Cell::new(""),
            ]);
            table.add_row(vec![
                Cell::new("Assignments (done/overdue/todo)"),
                Cell::new(format!(
                    "{} ({}/{}/{})",
                    snapshot.assignment_count,
                    snapshot.completed_count,
                    snapshot.overdue_count,
                    snapshot.todo_count
                )),
                Cell::new(format!("{:+.2}%", snapshot.deltas.completions_pct)),
            ]);
            table.add_row(vec![
                Cell::new("Average completion"),
                Cell::new(format!("{:.2}%", snapshot.average_completion)),
                Cell::new(format!("{:+.2}%", snapshot.deltas.attempts_pct)),
            ]);
            println!("{table}");

            for course in &snapshot.top_courses {
                println!("  {} — {} completions", course.title, course.completions);
            }
        }
    }

    if let Some(output) = output {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = output.join(format!("dashboard-{timestamp}.json"));
        snapshot.save_json(&path)?;
        eprintln!("Snapshot saved to {}", path.display());
    }

    Ok(())
}
