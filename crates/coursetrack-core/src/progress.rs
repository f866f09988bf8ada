//! Progress tracking: idempotent completion marks and percentage recompute.
//!
//! The mutation functions here are pure state transitions over a
//! [`ProgressRecord`]; the engine owns fetching, locking, and persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EntityKind};
use crate::model::{Course, ProgressRecord};

/// Caller-facing view of a progress record after a mark operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub account_id: String,
    pub course_id: String,
    pub percent: u8,
    pub completed: bool,
    pub completed_videos: usize,
    pub completed_quizzes: usize,
    /// Last progress-mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    pub fn of(record: &ProgressRecord) -> Self {
        Self {
            account_id: record.account_id.clone(),
            course_id: record.course_id.clone(),
            percent: record.percent,
            completed: record.completed,
            completed_videos: record.completed_videos.len(),
            completed_quizzes: record.completed_quizzes.len(),
            updated_at: record.updated_at,
        }
    }
}

/// Recompute percentage and completion flag against the course's *current*
/// content. Items completed under content that has since been removed stay
/// in the record but stop counting.
///
/// A course with zero assignable items is never complete and sits at 0%.
pub fn recompute(record: &mut ProgressRecord, course: &Course) {
    let total = course.total_items();
    if total == 0 {
        record.percent = 0;
        record.completed = false;
        return;
    }

    let done = record
        .completed_videos
        .iter()
        .filter(|v| course.has_video(v))
        .count()
        + record
            .completed_quizzes
            .iter()
            .filter(|q| course.quiz(q).is_some())
            .count();

    let percent = ((100.0 * done as f64) / total as f64).round() as u8;
    record.percent = percent.min(100);
    record.completed = record.percent >= 100;
}

/// Mark a video complete. Idempotent with respect to the completed set;
/// the percentage is always recomputed synchronously against current
/// content. Returns whether the record changed and needs saving.
///
/// `AlreadyComplete` marks the terminal no-op (item present, record fully
/// complete); callers report it as success.
pub fn apply_video(
    record: &mut ProgressRecord,
    course: &Course,
    video_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    if !course.has_video(video_id) {
        return Err(EngineError::InvalidAssociation {
            kind: EntityKind::Video,
            item_id: video_id.to_string(),
            course_id: course.id.clone(),
        });
    }
    let added = record.completed_videos.insert(video_id.to_string());
    finish_apply(record, course, added, now)
}

/// Mark a quiz complete. Same contract as [`apply_video`]. Callers only
/// invoke this for passing attempts; failing attempts are recorded in the
/// attempt log but never reach here.
pub fn apply_quiz(
    record: &mut ProgressRecord,
    course: &Course,
    quiz_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    if course.quiz(quiz_id).is_none() {
        return Err(EngineError::InvalidAssociation {
            kind: EntityKind::Quiz,
            item_id: quiz_id.to_string(),
            course_id: course.id.clone(),
        });
    }
    let added = record.completed_quizzes.insert(quiz_id.to_string());
    finish_apply(record, course, added, now)
}

fn finish_apply(
    record: &mut ProgressRecord,
    course: &Course,
    added: bool,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    let before = (record.percent, record.completed);
    recompute(record, course);

    if added {
        record.updated_at = now;
        return Ok(true);
    }
    if record.completed {
        return Err(EngineError::AlreadyComplete {
            account_id: record.account_id.clone(),
            course_id: record.course_id.clone(),
        });
    }
    // Re-mark of an existing item: no set mutation, but content drift may
    // still have moved the percentage.
    Ok((record.percent, record.completed) != before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, Quiz, Video};

    fn video(id: &str) -> Video {
        Video {
            id: id.into(),
            title: id.into(),
            duration_secs: None,
        }
    }

    fn quiz(id: &str) -> Quiz {
        Quiz {
            id: id.into(),
            title: id.into(),
            questions: vec![Question {
                prompt: "?".into(),
                choices: vec!["a".into(), "b".into()],
                correct_choice: 0,
                points: 1,
            }],
        }
    }

    fn course(videos: &[&str], quizzes: &[&str]) -> Course {
        Course {
            id: "c1".into(),
            title: "Course".into(),
            description: String::new(),
            passing_score: None,
            videos: videos.iter().map(|v| video(v)).collect(),
            quizzes: quizzes.iter().map(|q| quiz(q)).collect(),
        }
    }

    #[test]
    fn empty_course_is_never_complete() {
        let c = course(&[], &[]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        recompute(&mut record, &c);
        assert_eq!(record.percent, 0);
        assert!(!record.completed);
    }

    #[test]
    fn four_of_five_is_eighty_percent() {
        let c = course(&["v1", "v2", "v3", "v4"], &["q1"]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        for v in ["v1", "v2", "v3", "v4"] {
            apply_video(&mut record, &c, v, Utc::now()).unwrap();
        }
        assert_eq!(record.percent, 80);
        assert!(!record.completed);

        apply_quiz(&mut record, &c, "q1", Utc::now()).unwrap();
        assert_eq!(record.percent, 100);
        assert!(record.completed);
    }

    #[test]
    fn marking_twice_equals_marking_once() {
        let c = course(&["v1", "v2"], &[]);
        let mut once = ProgressRecord::new("a1", "c1", Utc::now());
        let now = Utc::now();
        apply_video(&mut once, &c, "v1", now).unwrap();

        let mut twice = once.clone();
        let changed = apply_video(&mut twice, &c, "v1", now + chrono::Duration::hours(1)).unwrap();
        assert!(!changed);
        assert_eq!(twice, once);
    }

    #[test]
    fn percentage_monotonic_under_fixed_content() {
        let c = course(&["v1", "v2", "v3"], &["q1"]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        let mut last = 0u8;
        for item in ["v1", "v2", "v3"] {
            apply_video(&mut record, &c, item, Utc::now()).unwrap();
            assert!(record.percent >= last);
            last = record.percent;
        }
    }

    #[test]
    fn unknown_item_is_invalid_association() {
        let c = course(&["v1"], &[]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        let err = apply_video(&mut record, &c, "v9", Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAssociation { .. }));
        let err = apply_quiz(&mut record, &c, "q9", Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAssociation { .. }));
    }

    #[test]
    fn added_content_lowers_percentage() {
        let mut c = course(&["v1"], &[]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        apply_video(&mut record, &c, "v1", Utc::now()).unwrap();
        assert_eq!(record.percent, 100);
        assert!(record.completed);

        // Content added after the fact: the denominator is live.
        c.videos.push(video("v2"));
        recompute(&mut record, &c);
        assert_eq!(record.percent, 50);
        assert!(!record.completed);
    }

    #[test]
    fn remark_on_completed_record_is_terminal_noop() {
        let c = course(&["v1"], &[]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        apply_video(&mut record, &c, "v1", Utc::now()).unwrap();
        assert!(record.completed);

        let err = apply_video(&mut record, &c, "v1", Utc::now()).unwrap_err();
        assert!(err.is_terminal_noop());
        assert_eq!(record.percent, 100);
    }

    #[test]
    fn removed_content_stops_counting() {
        let mut c = course(&["v1", "v2"], &[]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        apply_video(&mut record, &c, "v1", Utc::now()).unwrap();
        apply_video(&mut record, &c, "v2", Utc::now()).unwrap();
        assert!(record.completed);

        c.videos.retain(|v| v.id != "v2");
        recompute(&mut record, &c);
        assert_eq!(record.percent, 100); // v1 alone still covers all content
        c.videos.push(video("v3"));
        recompute(&mut record, &c);
        assert_eq!(record.percent, 50); // v2 no longer exists, v3 not done
    }

    #[test]
    fn snapshot_reflects_record() {
        let c = course(&["v1", "v2"], &[]);
        let mut record = ProgressRecord::new("a1", "c1", Utc::now());
        apply_video(&mut record, &c, "v1", Utc::now()).unwrap();
        let snap = ProgressSnapshot::of(&record);
        assert_eq!(snap.percent, 50);
        assert_eq!(snap.completed_videos, 1);
        assert!(!snap.completed);
    }
}
