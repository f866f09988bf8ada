//! coursetrack CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "coursetrack", version, about = "Course progress and deadline engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an account's assignments into completed/overdue/todo
    Classify {
        /// Path to a .toml roster file
        #[arg(long)]
        roster: PathBuf,

        /// Account id to classify
        #[arg(long)]
        account: String,

        /// Evaluate against this RFC 3339 instant instead of wall-clock now
        #[arg(long)]
        now: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Grade a quiz submission and record the attempt
    Submit {
        /// Path to a .toml roster file
        #[arg(long)]
        roster: PathBuf,

        /// Account id submitting the quiz
        #[arg(long)]
        account: String,

        /// Course the quiz belongs to
        #[arg(long)]
        course: String,

        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// Comma-separated answer indices, e.g. "1,0,2"
        #[arg(long)]
        answers: String,

        /// Pass policy: fixed (80% of questions) or configured (course passing_score)
        #[arg(long, default_value = "fixed")]
        policy: String,
    },

    /// Summarize the whole population
    Dashboard {
        /// Path to a .toml roster file
        #[arg(long)]
        roster: PathBuf,

        /// Evaluate against this RFC 3339 instant instead of wall-clock now
        #[arg(long)]
        now: Option<String>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the snapshot JSON into this directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run one reminder scheduler tick
    Tick {
        /// Path to a .toml roster file
        #[arg(long)]
        roster: PathBuf,

        /// Evaluate against this RFC 3339 instant instead of wall-clock now
        #[arg(long)]
        now: Option<String>,

        /// Base URL for deep links (overrides config)
        #[arg(long)]
        base_url: Option<String>,

        /// Reminder ledger file (overrides config)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Save the tick outcome JSON into this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate roster TOML files
    Validate {
        /// Path to a roster file or directory
        #[arg(long)]
        roster: PathBuf,
    },

    /// Create starter config and example roster
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursetrack=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify {
            roster,
            account,
            now,
            format,
        } => commands::classify::execute(roster, account, now, format).await,
        Commands::Submit {
            roster,
            account,
            course,
            quiz,
            answers,
            policy,
        } => commands::submit::execute(roster, account, course, quiz, answers, policy).await,
        Commands::Dashboard {
            roster,
            now,
            format,
            output,
        } => commands::dashboard::execute(roster, now, format, output).await,
        Commands::Tick {
            roster,
            now,
            base_url,
            ledger,
            output,
            config,
        } => commands::tick::execute(roster, now, base_url, ledger, output, config).await,
        Commands::Validate { roster } => commands::validate::execute(roster),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
