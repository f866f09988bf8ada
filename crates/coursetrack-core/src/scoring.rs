//! Quiz scoring and pass/fail determination.
//!
//! Two pass policies coexist deliberately: the fixed 80%-ceiling rule on
//! correct-answer count (canonical for quiz submission) and a looser
//! percentage-of-points rule against a course's stored `passing_score`.
//! Callers pick one per call site; the two paths stay distinguishable.

use serde::{Deserialize, Serialize};

use crate::model::Quiz;

/// Which pass rule to apply to a graded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "policy")]
pub enum PassPolicy {
    /// `passed = correct_count >= ceil(0.8 * total_questions)`.
    FixedThreshold,
    /// `passed = 100 * score / max_score >= passing_score`.
    ConfiguredThreshold { passing_score: u8 },
}

/// The outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub quiz_id: String,
    pub total_questions: u32,
    pub correct_count: u32,
    /// Sum of points for positionally matching answers.
    pub score: u32,
    pub max_score: u32,
    /// `round(100 * correct_count / total_questions)`, 0 for an empty quiz.
    pub percentage: u8,
    /// The correct-answer count required under the fixed policy.
    pub passing_threshold: u32,
    pub passed: bool,
    pub policy: PassPolicy,
}

/// Correct-answer count required to pass under the fixed policy:
/// `ceil(0.8 * total_questions)`.
pub fn fixed_threshold(total_questions: u32) -> u32 {
    (4 * total_questions).div_ceil(5)
}

/// Grade a submission against a quiz's answer key.
///
/// Answers align positionally with the questions; missing or extra entries
/// are non-matches. A quiz with zero questions never passes under either
/// policy.
pub fn grade(quiz: &Quiz, answers: &[usize], policy: PassPolicy) -> ScoreResult {
    let total_questions = quiz.questions.len() as u32;
    let max_score = quiz.max_score();

    let mut correct_count = 0u32;
    let mut score = 0u32;
    for (i, question) in quiz.questions.iter().enumerate() {
        if answers.get(i) == Some(&question.correct_choice) {
            correct_count += 1;
            score += question.points;
        }
    }

    let percentage = if total_questions == 0 {
        0
    } else {
        ((100.0 * correct_count as f64) / total_questions as f64).round() as u8
    };

    let passing_threshold = fixed_threshold(total_questions);
    let passed = if total_questions == 0 {
        false
    } else {
        match policy {
            PassPolicy::FixedThreshold => correct_count >= passing_threshold,
            PassPolicy::ConfiguredThreshold { passing_score } => {
                if max_score == 0 {
                    false
                } else {
                    (100.0 * score as f64) / max_score as f64 >= passing_score as f64
                }
            }
        }
    };

    ScoreResult {
        quiz_id: quiz.id.clone(),
        total_questions,
        correct_count,
        score,
        max_score,
        percentage,
        passing_threshold,
        passed,
        policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn quiz(n: usize) -> Quiz {
        Quiz {
            id: "q1".into(),
            title: "Quiz".into(),
            questions: (0..n)
                .map(|_| Question {
                    prompt: "?".into(),
                    choices: vec!["a".into(), "b".into()],
                    correct_choice: 0,
                    points: 1,
                })
                .collect(),
        }
    }

    /// First `correct` answers right, the rest wrong.
    fn answers(correct: usize, total: usize) -> Vec<usize> {
        (0..total).map(|i| usize::from(i >= correct)).collect()
    }

    #[test]
    fn fixed_threshold_is_ceiling() {
        assert_eq!(fixed_threshold(10), 8);
        assert_eq!(fixed_threshold(5), 4);
        assert_eq!(fixed_threshold(3), 3); // ceil(2.4)
        assert_eq!(fixed_threshold(1), 1);
        assert_eq!(fixed_threshold(0), 0);
    }

    #[test]
    fn pass_boundary_at_8_of_10() {
        let q = quiz(10);
        let result = grade(&q, &answers(8, 10), PassPolicy::FixedThreshold);
        assert!(result.passed);
        assert_eq!(result.correct_count, 8);
        assert_eq!(result.percentage, 80);

        let result = grade(&q, &answers(7, 10), PassPolicy::FixedThreshold);
        assert!(!result.passed);
        assert_eq!(result.percentage, 70);
    }

    #[test]
    fn six_of_ten_fails_with_sixty_percent() {
        let result = grade(&quiz(10), &answers(6, 10), PassPolicy::FixedThreshold);
        assert_eq!(result.score, 6);
        assert_eq!(result.correct_count, 6);
        assert!(!result.passed);
        assert_eq!(result.percentage, 60);
    }

    #[test]
    fn missing_answers_are_non_matches() {
        let q = quiz(10);
        // Only 3 answers submitted, all correct.
        let result = grade(&q, &[0, 0, 0], PassPolicy::FixedThreshold);
        assert_eq!(result.correct_count, 3);
        assert!(!result.passed);
    }

    #[test]
    fn extra_answers_are_ignored() {
        let q = quiz(2);
        let result = grade(&q, &[0, 0, 0, 0, 0], PassPolicy::FixedThreshold);
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_questions, 2);
        assert!(result.passed);
    }

    #[test]
    fn points_weight_the_score_not_the_count() {
        let q = Quiz {
            id: "weighted".into(),
            title: "Weighted".into(),
            questions: vec![
                Question {
                    prompt: "?".into(),
                    choices: vec!["a".into(), "b".into()],
                    correct_choice: 0,
                    points: 5,
                },
                Question {
                    prompt: "?".into(),
                    choices: vec!["a".into(), "b".into()],
                    correct_choice: 1,
                    points: 1,
                },
            ],
        };
        let result = grade(&q, &[0, 0], PassPolicy::FixedThreshold);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.score, 5);
        assert_eq!(result.max_score, 6);
    }

    #[test]
    fn configured_policy_uses_points_percentage() {
        let q = quiz(10);
        // 6/10 points = 60%: fails fixed, passes a configured 50% threshold.
        let fixed = grade(&q, &answers(6, 10), PassPolicy::FixedThreshold);
        assert!(!fixed.passed);

        let configured = grade(
            &q,
            &answers(6, 10),
            PassPolicy::ConfiguredThreshold { passing_score: 50 },
        );
        assert!(configured.passed);

        let strict = grade(
            &q,
            &answers(6, 10),
            PassPolicy::ConfiguredThreshold { passing_score: 61 },
        );
        assert!(!strict.passed);
    }

    #[test]
    fn empty_quiz_never_passes() {
        let q = quiz(0);
        let fixed = grade(&q, &[], PassPolicy::FixedThreshold);
        assert!(!fixed.passed);
        assert_eq!(fixed.percentage, 0);

        let configured = grade(&q, &[], PassPolicy::ConfiguredThreshold { passing_score: 0 });
        assert!(!configured.passed);
    }
}
