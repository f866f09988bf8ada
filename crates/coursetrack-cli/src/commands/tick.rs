//! The `coursetrack tick` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursetrack_core::traits::{Notifier, Store};
use coursetrack_providers::config::load_config_from;
use coursetrack_providers::create_notifier;
use coursetrack_scheduler::{ReminderLedger, ReminderScheduler};

use super::{build_clock, load_store};

pub async fn execute(
    roster_path: PathBuf,
    now: Option<String>,
    base_url: Option<String>,
    ledger_path: Option<PathBuf>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (_, store) = load_store(&roster_path)?;
    let clock = build_clock(now.as_deref())?;

    let base_url = base_url.unwrap_or_else(|| config.base_url.clone());
    let ledger_path = ledger_path.unwrap_or_else(|| config.ledger_path.clone());
    let notifier: Arc<dyn Notifier> = create_notifier(&config.notifier);
    let ledger = ReminderLedger::load_or_default(&ledger_path)?;

    let scheduler = ReminderScheduler::new(
        store as Arc<dyn Store>,
        notifier,
        clock,
        ledger,
        &base_url,
    );

    let outcome = scheduler.run_tick().await?;
    scheduler.ledger().save_json(&ledger_path)?;

    println!(
        "Tick {}: scanned {} accounts, {} assignments",
        outcome.run_id, outcome.accounts_scanned, outcome.assignments_scanned
    );

    if outcome.sent.is_empty() {
        println!("No reminders due.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Tier", "Account", "Course", "Email"]);
        for notice in &outcome.sent {
            table.add_row(vec![
                Cell::new(notice.tier.as_str()),
                Cell::new(&notice.account_id),
                Cell::new(notice.course_title.as_deref().unwrap_or("-")),
                Cell::new(&notice.email),
            ]);
        }
        println!("{table}");
    }

    if !outcome.errors.is_empty() {
        eprintln!("{} delivery failure(s):", outcome.errors.len());
        for error in &outcome.errors {
            eprintln!("  {} [{:?}]: {}", error.account_id, error.tier, error.message);
        }
    }

    if let Some(output) = output {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = output.join(format!("tick-{timestamp}.json"));
        outcome.save_json(&path)?;
        eprintln!("Outcome saved to {}", path.display());
    }

    Ok(())
}
