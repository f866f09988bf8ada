//! The `coursetrack init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create coursetrack.toml
    if std::path::Path::new("coursetrack.toml").exists() {
        println!("coursetrack.toml already exists, skipping.");
    } else {
        std::fs::write("coursetrack.toml", SAMPLE_CONFIG)?;
        println!("Created coursetrack.toml");
    }

    // Create example roster
    std::fs::create_dir_all("rosters")?;
    let example_path = std::path::Path::new("rosters/example.toml");
    if example_path.exists() {
        println!("rosters/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ROSTER)?;
        println!("Created rosters/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit coursetrack.toml with your webhook endpoint");
    println!("  2. Run: coursetrack validate --roster rosters/example.toml");
    println!("  3. Run: coursetrack classify --roster rosters/example.toml --account alice");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# coursetrack configuration

base_url = "https://app.coursetrack.example"
ledger_path = "./coursetrack-ledger.json"
output_dir = "./coursetrack-results"

# Reminder transport. Use type = "webhook" with an endpoint for real delivery.
[notifier]
type = "console"

# [notifier]
# type = "webhook"
# endpoint = "https://hooks.example.com/reminders"
# auth_token = "${COURSETRACK_WEBHOOK_TOKEN}"
"#;

const EXAMPLE_ROSTER: &str = r#"[roster]
id = "example"
name = "Example Roster"
description = "A small roster to get started"

[[courses]]
id = "onboarding"
title = "Company Onboarding"
passing_score = 70

[[courses.videos]]
id = "welcome"
title = "Welcome"
duration_secs = 420

[[courses.videos]]
id = "security-basics"
title = "Security Basics"
duration_secs = 900

[[courses.quizzes]]
id = "final"
title = "Final Quiz"

[[courses.quizzes.questions]]
prompt = "Where do you report a phishing email?"
choices = ["Delete it", "security@ inbox", "Reply to it"]
correct_choice = 1

[[courses.quizzes.questions]]
prompt = "How often do access reviews run?"
choices = ["Weekly", "Quarterly", "Never"]
correct_choice = 1

[[accounts]]
id = "alice"
email = "alice@example.com"
name = "Alice"
created_at = "2026-08-01T09:00:00Z"
activated_at = "2026-08-02T10:00:00Z"
has_password = true

[[accounts]]
id = "bob"
email = "bob@example.com"
name = "Bob"
created_at = "2026-08-17T09:00:00Z"

[[assignments]]
account_id = "alice"
course_id = "onboarding"
due_date = "2026-09-15T00:00:00Z"
assigned_at = "2026-08-01T09:00:00Z"

[[assignments]]
account_id = "bob"
course_id = "onboarding"
due_date = "2026-09-15T00:00:00Z"
assigned_at = "2026-08-17T09:00:00Z"

[[progress]]
account_id = "alice"
course_id = "onboarding"
completed_videos = ["welcome"]
updated_at = "2026-08-05T12:00:00Z"
"#;
