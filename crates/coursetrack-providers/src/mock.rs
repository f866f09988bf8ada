//! Recording notifier for testing the scheduler without a real transport.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use coursetrack_core::traits::{Notifier, ReminderNotice};

/// A mock notifier that records every notice it receives.
///
/// Individual accounts can be marked as failing so scheduler tests can
/// exercise per-item error isolation and retry-after-failure behavior.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<ReminderNotice>>,
    failing_accounts: Mutex<HashSet<String>>,
    call_count: AtomicU32,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice sent so far, in delivery order.
    pub fn sent(&self) -> Vec<ReminderNotice> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of send calls, failures included.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Make sends for `account_id` fail until cleared.
    pub fn fail_account(&self, account_id: &str) {
        self.failing_accounts
            .lock()
            .unwrap()
            .insert(account_id.to_string());
    }

    /// Let previously failing sends for `account_id` succeed again.
    pub fn clear_failure(&self, account_id: &str) {
        self.failing_accounts.lock().unwrap().remove(account_id);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, notice: &ReminderNotice) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if self
            .failing_accounts
            .lock()
            .unwrap()
            .contains(&notice.account_id)
        {
            anyhow::bail!("injected send failure for {}", notice.account_id);
        }

        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
