//! Engine error taxonomy.
//!
//! Defined in `coursetrack-core` so callers and collaborator implementations
//! can classify failures for no-op/retry decisions without string matching.

use std::fmt;

use thiserror::Error;

/// The kind of entity an operation failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Course,
    Video,
    Quiz,
    Account,
    Assignment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Course => write!(f, "course"),
            EntityKind::Video => write!(f, "video"),
            EntityKind::Quiz => write!(f, "quiz"),
            EntityKind::Account => write!(f, "account"),
            EntityKind::Assignment => write!(f, "assignment"),
        }
    }
}

/// Errors surfaced by the progress/deadline engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced course/video/quiz/account/assignment is unknown.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// An item was referenced through a course it does not belong to.
    /// The cross-check is mandatory before any scoring or mark operation.
    #[error("{kind} {item_id} does not belong to course {course_id}")]
    InvalidAssociation {
        kind: EntityKind,
        item_id: String,
        course_id: String,
    },

    /// The operation targeted a fully completed record where it is a defined
    /// no-op. Callers treat this as success, not failure.
    #[error("progress for account {account_id} in course {course_id} is already complete")]
    AlreadyComplete {
        account_id: String,
        course_id: String,
    },

    /// A transient storage failure. Retried by the caller's policy, not here.
    #[error("storage error: {0}")]
    Storage(String),

    /// A transient notification delivery failure.
    #[error("notification error: {0}")]
    Notify(String),
}

impl EngineError {
    /// Returns `true` if this error marks a terminal-state no-op that callers
    /// should report as success.
    pub fn is_terminal_noop(&self) -> bool {
        matches!(self, EngineError::AlreadyComplete { .. })
    }

    /// Returns `true` if this error is transient I/O against a collaborator
    /// and eligible for retry on a later pass.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Storage(_) | EngineError::Notify(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_noop_classification() {
        let e = EngineError::AlreadyComplete {
            account_id: "a1".into(),
            course_id: "c1".into(),
        };
        assert!(e.is_terminal_noop());
        assert!(!e.is_transient());
    }

    #[test]
    fn transient_classification() {
        assert!(EngineError::Storage("connection reset".into()).is_transient());
        assert!(EngineError::Notify("timeout".into()).is_transient());
        let nf = EngineError::NotFound {
            kind: EntityKind::Quiz,
            id: "q9".into(),
        };
        assert!(!nf.is_transient());
        assert!(!nf.is_terminal_noop());
    }

    #[test]
    fn display_includes_ids() {
        let e = EngineError::InvalidAssociation {
            kind: EntityKind::Video,
            item_id: "v1".into(),
            course_id: "c2".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("v1"));
        assert!(msg.contains("c2"));
    }
}
