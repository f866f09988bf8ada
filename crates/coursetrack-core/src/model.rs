//! Core data model types for coursetrack.
//!
//! These are the fundamental types the entire system uses to represent
//! courses, learner accounts, assignments, progress, and quiz attempts.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course: the unit of assignable learning content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier for this course.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description shown to learners.
    #[serde(default)]
    pub description: String,
    /// Stored passing score in percent of points, used by the configured
    /// (percentage-of-points) pass policy. The fixed 80%-ceiling policy
    /// ignores it.
    #[serde(default)]
    pub passing_score: Option<u8>,
    /// Videos belonging to this course.
    #[serde(default)]
    pub videos: Vec<Video>,
    /// Quizzes belonging to this course.
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
}

impl Course {
    /// Total number of assignable items (videos + quizzes), evaluated
    /// against the current content.
    pub fn total_items(&self) -> usize {
        self.videos.len() + self.quizzes.len()
    }

    /// Whether `video_id` belongs to this course.
    pub fn has_video(&self, video_id: &str) -> bool {
        self.videos.iter().any(|v| v.id == video_id)
    }

    /// Look up a quiz by id, `None` if it does not belong to this course.
    pub fn quiz(&self, quiz_id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == quiz_id)
    }
}

/// A video lesson within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    /// Playback length in seconds, if known.
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

/// A quiz within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    /// Ordered questions; submitted answers align positionally.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Sum of point values across all questions.
    pub fn max_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    pub prompt: String,
    /// Answer choices presented to the learner.
    pub choices: Vec<String>,
    /// 0-based index of the correct choice.
    pub correct_choice: usize,
    /// Point value awarded for a correct answer.
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    1
}

/// A learner (or employee) account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    /// When the account was created. Drives pre-activation reminders.
    pub created_at: DateTime<Utc>,
    /// When the account first logged in / activated, if ever.
    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,
    /// Whether the account has ever set a password. Decides whether deep
    /// links point at signup or login.
    #[serde(default)]
    pub has_password: bool,
}

/// The pairing of a course to an account with a due date.
///
/// Created when a course is attached to a group (propagating to every
/// member); immutable once created except for removal. Owned by the
/// group/employment aggregate, not by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAssignment {
    pub account_id: String,
    pub course_id: String,
    pub due_date: DateTime<Utc>,
    pub assigned_at: DateTime<Utc>,
}

/// Per-(account, course) completion state.
///
/// The percentage is always recomputed against the course's *current*
/// content, so content added after partial completion lowers existing
/// percentages. That is the intended behavior; a frozen denominator would
/// be a deliberate product change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub account_id: String,
    pub course_id: String,
    /// Ids of completed videos. Set semantics: re-completion is a no-op.
    #[serde(default)]
    pub completed_videos: BTreeSet<String>,
    /// Ids of passed quizzes. Set semantics: re-completion is a no-op.
    #[serde(default)]
    pub completed_quizzes: BTreeSet<String>,
    /// Integer percentage 0–100. Invariant: `completed == (percent >= 100)`.
    pub percent: u8,
    pub completed: bool,
    /// Timestamp of the last progress mutation.
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// An empty record for an account/course pair, created lazily on the
    /// first completion event.
    pub fn new(account_id: &str, course_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            account_id: account_id.to_string(),
            course_id: course_id.to_string(),
            completed_videos: BTreeSet::new(),
            completed_quizzes: BTreeSet::new(),
            percent: 0,
            completed: false,
            updated_at: now,
        }
    }

    /// Number of completed items across both sets.
    pub fn completed_items(&self) -> usize {
        self.completed_videos.len() + self.completed_quizzes.len()
    }
}

/// One recorded quiz submission. Append-only; multiple attempts per
/// account/quiz are allowed, failing attempts included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub account_id: String,
    pub course_id: String,
    pub quiz_id: String,
    /// Submitted answer indices, positionally aligned with the questions.
    pub answers: Vec<usize>,
    pub correct_count: u32,
    /// Sum of points for matching positions.
    pub score: u32,
    pub passed: bool,
    pub submitted_at: DateTime<Utc>,
}
