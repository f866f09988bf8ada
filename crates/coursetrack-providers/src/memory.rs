//! In-memory `Store` implementation.
//!
//! The reference implementation of the storage seam: everything lives in
//! one `RwLock`-guarded map set, usually populated from a parsed roster.
//! Failure injection flags let the scheduler and dashboard tests exercise
//! their degraded paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use coursetrack_core::error::{EngineError, EntityKind};
use coursetrack_core::model::{Account, Course, CourseAssignment, ProgressRecord, QuizAttempt};
use coursetrack_core::parser::Roster;
use coursetrack_core::traits::Store;

#[derive(Default)]
struct Inner {
    courses: HashMap<String, Course>,
    accounts: HashMap<String, Account>,
    assignments: Vec<CourseAssignment>,
    progress: HashMap<(String, String), ProgressRecord>,
    attempts: Vec<QuizAttempt>,
}

/// In-memory store backed by `RwLock`-guarded maps.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a store from a parsed roster, seeds included.
    pub fn from_roster(roster: &Roster) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write().unwrap_or_else(|e| e.into_inner());
            for course in &roster.courses {
                inner.courses.insert(course.id.clone(), course.clone());
            }
            for account in &roster.accounts {
                inner.accounts.insert(account.id.clone(), account.clone());
            }
            inner.assignments = roster.assignments.clone();
            for record in &roster.progress {
                inner.progress.insert(
                    (record.account_id.clone(), record.course_id.clone()),
                    record.clone(),
                );
            }
            inner.attempts = roster.attempts.clone();
        }
        store
    }

    pub fn insert_course(&self, course: Course) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.courses.insert(course.id.clone(), course);
    }

    pub fn insert_account(&self, account: Account) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.accounts.insert(account.id.clone(), account);
    }

    pub fn insert_assignment(&self, assignment: CourseAssignment) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.assignments.push(assignment);
    }

    /// Make every read fail with a storage error. For degraded-path tests.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn check_read(&self) -> Result<(), EngineError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            Err(EngineError::Storage("injected read failure".into()))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), EngineError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            Err(EngineError::Storage("injected write failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn course(&self, course_id: &str) -> Result<Course, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .courses
            .get(course_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: EntityKind::Course,
                id: course_id.to_string(),
            })
    }

    async fn courses(&self) -> Result<Vec<Course>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.courses.values().cloned().collect())
    }

    async fn account(&self, account_id: &str) -> Result<Account, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: EntityKind::Account,
                id: account_id.to_string(),
            })
    }

    async fn accounts(&self) -> Result<Vec<Account>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.accounts.values().cloned().collect())
    }

    async fn progress(
        &self,
        account_id: &str,
        course_id: &str,
    ) -> Result<Option<ProgressRecord>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .progress
            .get(&(account_id.to_string(), course_id.to_string()))
            .cloned())
    }

    async fn progress_records(&self) -> Result<Vec<ProgressRecord>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.progress.values().cloned().collect())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), EngineError> {
        self.check_write()?;
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.progress.insert(
            (record.account_id.clone(), record.course_id.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn assignments_for_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<CourseAssignment>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .assignments
            .iter()
            .filter(|a| a.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn all_assignments(&self) -> Result<Vec<CourseAssignment>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.assignments.clone())
    }

    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<(), EngineError> {
        self.check_write()?;
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.attempts.push(attempt.clone());
        Ok(())
    }

    async fn attempts(&self) -> Result<Vec<QuizAttempt>, EngineError> {
        self.check_read()?;
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.attempts.clone())
    }
}
