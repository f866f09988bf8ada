//! TOML roster parser.
//!
//! Loads rosters (courses, accounts, assignments, optional seeded progress
//! and quiz attempts) from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{Account, Course, CourseAssignment, ProgressRecord, QuizAttempt};
use crate::progress;
use crate::scoring::{self, PassPolicy};

/// A fully parsed roster: the population one store instance serves.
#[derive(Debug, Clone)]
pub struct Roster {
    pub id: String,
    pub name: String,
    pub description: String,
    pub courses: Vec<Course>,
    pub accounts: Vec<Account>,
    pub assignments: Vec<CourseAssignment>,
    /// Progress records rebuilt from seed entries, percentages recomputed.
    pub progress: Vec<ProgressRecord>,
    /// Attempts rebuilt from seed entries, regraded under the fixed policy.
    pub attempts: Vec<QuizAttempt>,
}

impl Roster {
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn account(&self, account_id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == account_id)
    }
}

/// Intermediate TOML structure for parsing roster files.
#[derive(Debug, Deserialize)]
struct TomlRosterFile {
    roster: TomlRosterHeader,
    #[serde(default)]
    courses: Vec<Course>,
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    assignments: Vec<CourseAssignment>,
    #[serde(default)]
    progress: Vec<TomlProgressSeed>,
    #[serde(default)]
    attempts: Vec<TomlAttemptSeed>,
}

#[derive(Debug, Deserialize)]
struct TomlRosterHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// Seed for a progress record. Percentage and completion flag are never
/// read from the file; they are recomputed against the parsed content.
#[derive(Debug, Deserialize)]
struct TomlProgressSeed {
    account_id: String,
    course_id: String,
    #[serde(default)]
    completed_videos: Vec<String>,
    #[serde(default)]
    completed_quizzes: Vec<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Seed for a historical quiz attempt, regraded on load so counts and the
/// pass flag always match the answer key in the same file.
#[derive(Debug, Deserialize)]
struct TomlAttemptSeed {
    account_id: String,
    course_id: String,
    quiz_id: String,
    answers: Vec<usize>,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

/// Parse a single TOML file into a `Roster`.
pub fn parse_roster(path: &Path) -> Result<Roster> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file: {}", path.display()))?;

    parse_roster_str(&content, path)
}

/// Parse a TOML string into a `Roster` (useful for testing).
pub fn parse_roster_str(content: &str, source_path: &Path) -> Result<Roster> {
    let parsed: TomlRosterFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let now = Utc::now();

    let records = parsed
        .progress
        .into_iter()
        .map(|seed| {
            let mut record =
                ProgressRecord::new(&seed.account_id, &seed.course_id, seed.updated_at.unwrap_or(now));
            record.completed_videos = seed.completed_videos.into_iter().collect();
            record.completed_quizzes = seed.completed_quizzes.into_iter().collect();
            if let Some(course) = parsed.courses.iter().find(|c| c.id == seed.course_id) {
                progress::recompute(&mut record, course);
            }
            record
        })
        .collect();

    let attempts = parsed
        .attempts
        .into_iter()
        .map(|seed| {
            let quiz = parsed
                .courses
                .iter()
                .find(|c| c.id == seed.course_id)
                .and_then(|c| c.quiz(&seed.quiz_id))
                .with_context(|| {
                    format!(
                        "attempt seed references unknown quiz {} in course {}",
                        seed.quiz_id, seed.course_id
                    )
                })?;
            let graded = scoring::grade(quiz, &seed.answers, PassPolicy::FixedThreshold);
            Ok(QuizAttempt {
                id: Uuid::new_v4(),
                account_id: seed.account_id,
                course_id: seed.course_id,
                quiz_id: seed.quiz_id,
                answers: seed.answers,
                correct_count: graded.correct_count,
                score: graded.score,
                passed: graded.passed,
                submitted_at: seed.submitted_at.unwrap_or(now),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Roster {
        id: parsed.roster.id,
        name: parsed.roster.name,
        description: parsed.roster.description,
        courses: parsed.courses,
        accounts: parsed.accounts,
        assignments: parsed.assignments,
        progress: records,
        attempts,
    })
}

/// Recursively load all `.toml` roster files from a directory.
pub fn load_roster_directory(dir: &Path) -> Result<Vec<Roster>> {
    let mut rosters = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            rosters.extend(load_roster_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_roster(&path) {
                Ok(roster) => rosters.push(roster),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(rosters)
}

/// A warning from roster validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The id of the offending entity (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a roster for common issues: duplicate ids, dangling references,
/// out-of-range answer keys, empty courses, due dates before assignment.
pub fn validate_roster(roster: &Roster) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut course_ids = std::collections::HashSet::new();
    for course in &roster.courses {
        if !course_ids.insert(&course.id) {
            warnings.push(ValidationWarning {
                subject: Some(course.id.clone()),
                message: format!("duplicate course id: {}", course.id),
            });
        }

        if course.total_items() == 0 {
            warnings.push(ValidationWarning {
                subject: Some(course.id.clone()),
                message: "course has no videos or quizzes and can never be completed".into(),
            });
        }

        let mut item_ids = std::collections::HashSet::new();
        for video in &course.videos {
            if !item_ids.insert(&video.id) {
                warnings.push(ValidationWarning {
                    subject: Some(course.id.clone()),
                    message: format!("duplicate item id within course: {}", video.id),
                });
            }
        }
        for quiz in &course.quizzes {
            if !item_ids.insert(&quiz.id) {
                warnings.push(ValidationWarning {
                    subject: Some(course.id.clone()),
                    message: format!("duplicate item id within course: {}", quiz.id),
                });
            }
            if quiz.questions.is_empty() {
                warnings.push(ValidationWarning {
                    subject: Some(quiz.id.clone()),
                    message: "quiz has no questions and can never be passed".into(),
                });
            }
            for (i, question) in quiz.questions.iter().enumerate() {
                if question.correct_choice >= question.choices.len() {
                    warnings.push(ValidationWarning {
                        subject: Some(quiz.id.clone()),
                        message: format!(
                            "question {i} correct_choice {} out of range ({} choices)",
                            question.correct_choice,
                            question.choices.len()
                        ),
                    });
                }
            }
        }
    }

    let mut account_ids = std::collections::HashSet::new();
    for account in &roster.accounts {
        if !account_ids.insert(&account.id) {
            warnings.push(ValidationWarning {
                subject: Some(account.id.clone()),
                message: format!("duplicate account id: {}", account.id),
            });
        }
    }

    for assignment in &roster.assignments {
        if roster.course(&assignment.course_id).is_none() {
            warnings.push(ValidationWarning {
                subject: Some(assignment.course_id.clone()),
                message: format!(
                    "assignment for account {} references unknown course {}",
                    assignment.account_id, assignment.course_id
                ),
            });
        }
        if roster.account(&assignment.account_id).is_none() {
            warnings.push(ValidationWarning {
                subject: Some(assignment.account_id.clone()),
                message: format!(
                    "assignment for course {} references unknown account {}",
                    assignment.course_id, assignment.account_id
                ),
            });
        }
        if assignment.due_date < assignment.assigned_at {
            warnings.push(ValidationWarning {
                subject: Some(assignment.course_id.clone()),
                message: format!(
                    "assignment for account {} is due before it was assigned",
                    assignment.account_id
                ),
            });
        }
    }

    for record in &roster.progress {
        match roster.course(&record.course_id) {
            None => warnings.push(ValidationWarning {
                subject: Some(record.course_id.clone()),
                message: format!(
                    "progress seed references unknown course {}",
                    record.course_id
                ),
            }),
            Some(course) => {
                for video_id in &record.completed_videos {
                    if !course.has_video(video_id) {
                        warnings.push(ValidationWarning {
                            subject: Some(record.course_id.clone()),
                            message: format!(
                                "progress seed marks unknown video {video_id} complete"
                            ),
                        });
                    }
                }
                for quiz_id in &record.completed_quizzes {
                    if course.quiz(quiz_id).is_none() {
                        warnings.push(ValidationWarning {
                            subject: Some(record.course_id.clone()),
                            message: format!(
                                "progress seed marks unknown quiz {quiz_id} complete"
                            ),
                        });
                    }
                }
            }
        }
        if roster.account(&record.account_id).is_none() {
            warnings.push(ValidationWarning {
                subject: Some(record.account_id.clone()),
                message: format!(
                    "progress seed references unknown account {}",
                    record.account_id
                ),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[roster]
id = "demo"
name = "Demo Roster"
description = "Onboarding cohort"

[[courses]]
id = "onboarding"
title = "Company Onboarding"
passing_score = 70

[[courses.videos]]
id = "welcome"
title = "Welcome"
duration_secs = 300

[[courses.videos]]
id = "tooling"
title = "Tooling"

[[courses.quizzes]]
id = "final"
title = "Final Quiz"

[[courses.quizzes.questions]]
prompt = "2 + 2?"
choices = ["3", "4"]
correct_choice = 1

[[courses.quizzes.questions]]
prompt = "Capital of France?"
choices = ["Paris", "Rome"]
correct_choice = 0
points = 2

[[accounts]]
id = "alice"
email = "alice@example.com"
name = "Alice"
created_at = "2026-07-01T09:00:00Z"
activated_at = "2026-07-02T09:00:00Z"
has_password = true

[[assignments]]
account_id = "alice"
course_id = "onboarding"
due_date = "2026-09-01T00:00:00Z"
assigned_at = "2026-08-01T00:00:00Z"

[[progress]]
account_id = "alice"
course_id = "onboarding"
completed_videos = ["welcome"]
updated_at = "2026-08-05T12:00:00Z"

[[attempts]]
account_id = "alice"
course_id = "onboarding"
quiz_id = "final"
answers = [1, 0]
submitted_at = "2026-08-06T12:00:00Z"
"#;

    #[test]
    fn parse_valid_roster() {
        let roster = parse_roster_str(VALID_TOML, &PathBuf::from("demo.toml")).unwrap();
        assert_eq!(roster.id, "demo");
        assert_eq!(roster.courses.len(), 1);
        assert_eq!(roster.courses[0].total_items(), 3);
        assert_eq!(roster.accounts.len(), 1);
        assert_eq!(roster.assignments.len(), 1);
    }

    #[test]
    fn progress_seed_percent_is_recomputed() {
        let roster = parse_roster_str(VALID_TOML, &PathBuf::from("demo.toml")).unwrap();
        let record = &roster.progress[0];
        // 1 of 3 items complete.
        assert_eq!(record.percent, 33);
        assert!(!record.completed);
    }

    #[test]
    fn attempt_seed_is_regraded() {
        let roster = parse_roster_str(VALID_TOML, &PathBuf::from("demo.toml")).unwrap();
        let attempt = &roster.attempts[0];
        assert_eq!(attempt.correct_count, 2);
        assert_eq!(attempt.score, 3); // 1 + 2 points
        assert!(attempt.passed); // 2/2 >= ceil(0.8 * 2)
    }

    #[test]
    fn attempt_seed_for_unknown_quiz_fails() {
        let toml = r#"
[roster]
id = "bad"
name = "Bad"

[[attempts]]
account_id = "alice"
course_id = "nope"
quiz_id = "missing"
answers = [0]
"#;
        let result = parse_roster_str(toml, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_dangling_assignment() {
        let toml = r#"
[roster]
id = "dangling"
name = "Dangling"

[[assignments]]
account_id = "ghost"
course_id = "nowhere"
due_date = "2026-09-01T00:00:00Z"
assigned_at = "2026-08-01T00:00:00Z"
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("d.toml")).unwrap();
        let warnings = validate_roster(&roster);
        assert!(warnings.iter().any(|w| w.message.contains("unknown course")));
        assert!(warnings.iter().any(|w| w.message.contains("unknown account")));
    }

    #[test]
    fn validate_out_of_range_answer_key() {
        let toml = r#"
[roster]
id = "oob"
name = "OOB"

[[courses]]
id = "c1"
title = "Course"

[[courses.quizzes]]
id = "q1"
title = "Quiz"

[[courses.quizzes.questions]]
prompt = "?"
choices = ["a", "b"]
correct_choice = 5
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("o.toml")).unwrap();
        let warnings = validate_roster(&roster);
        assert!(warnings.iter().any(|w| w.message.contains("out of range")));
    }

    #[test]
    fn validate_empty_course_and_due_before_assigned() {
        let toml = r#"
[roster]
id = "warns"
name = "Warns"

[[courses]]
id = "empty"
title = "Empty Course"

[[accounts]]
id = "alice"
email = "alice@example.com"
name = "Alice"
created_at = "2026-07-01T09:00:00Z"

[[assignments]]
account_id = "alice"
course_id = "empty"
due_date = "2026-07-01T00:00:00Z"
assigned_at = "2026-08-01T00:00:00Z"
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("w.toml")).unwrap();
        let warnings = validate_roster(&roster);
        assert!(warnings.iter().any(|w| w.message.contains("never be completed")));
        assert!(warnings.iter().any(|w| w.message.contains("due before")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_roster_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("demo.toml");
        std::fs::write(&file_path, VALID_TOML).unwrap();

        let rosters = load_roster_directory(dir.path()).unwrap();
        assert_eq!(rosters.len(), 1);
        assert_eq!(rosters[0].id, "demo");
    }
}
