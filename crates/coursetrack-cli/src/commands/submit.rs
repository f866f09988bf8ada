//! The `coursetrack submit` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use coursetrack_core::engine::ProgressEngine;
use coursetrack_core::scoring::PassPolicy;
use coursetrack_core::traits::Store;

use super::{build_clock, load_store};

pub async fn execute(
    roster_path: PathBuf,
    account: String,
    course: String,
    quiz: String,
    answers: String,
    policy: String,
) -> Result<()> {
    let (roster, store) = load_store(&roster_path)?;
    let clock = build_clock(None)?;
    let engine = ProgressEngine::new(Arc::clone(&store) as Arc<dyn Store>, clock);

    let answers = parse_answers(&answers)?;

    let result = match policy.as_str() {
        "fixed" => engine.submit_quiz(&account, &course, &quiz, &answers).await?,
        "configured" => {
            let passing_score = roster
                .course(&course)
                .and_then(|c| c.passing_score)
                .context("course has no passing_score; use --policy fixed")?;
            engine
                .submit_quiz_with_policy(
                    &account,
                    &course,
                    &quiz,
                    &answers,
                    PassPolicy::ConfiguredThreshold { passing_score },
                )
                .await?
        }
        other => anyhow::bail!("unknown policy: {other} (expected fixed or configured)"),
    };

    println!(
        "Quiz {}: {}/{} correct, score {}/{} ({}%)",
        result.quiz_id,
        result.correct_count,
        result.total_questions,
        result.score,
        result.max_score,
        result.percentage
    );
    println!(
        "Result: {} (threshold {} correct)",
        if result.passed { "PASSED" } else { "FAILED" },
        result.passing_threshold
    );

    if let Some(snapshot) = engine.get_progress(&account, &course).await? {
        println!(
            "Progress in {}: {}%{}",
            course,
            snapshot.percent,
            if snapshot.completed { " (completed)" } else { "" }
        );
    }

    Ok(())
}

fn parse_answers(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<usize>()
                .with_context(|| format!("invalid answer index: {s}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answers_accepts_spaces() {
        assert_eq!(parse_answers("1, 0,2").unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn parse_answers_rejects_garbage() {
        assert!(parse_answers("1,x,2").is_err());
        assert!(parse_answers("").is_err());
    }
}
