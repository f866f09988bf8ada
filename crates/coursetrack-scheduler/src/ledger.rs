//! The at-most-once reminder ledger.
//!
//! Each (account, assignment, tier) triple is claimed atomically before a
//! send. A claim that ends in a failed delivery is released so the next
//! tick inside the window can retry; a successful send keeps the claim for
//! the lifetime of the ledger file.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use coursetrack_core::traits::ReminderTier;

/// Identity of one reminder: who, which assignment (if any), which tier.
/// Pre-activation reminders have no course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderKey {
    pub account_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    pub tier: ReminderTier,
}

impl ReminderKey {
    pub fn account(account_id: &str, tier: ReminderTier) -> Self {
        Self {
            account_id: account_id.to_string(),
            course_id: None,
            tier,
        }
    }

    pub fn assignment(account_id: &str, course_id: &str, tier: ReminderTier) -> Self {
        Self {
            account_id: account_id.to_string(),
            course_id: Some(course_id.to_string()),
            tier,
        }
    }
}

/// Sent-reminder ledger with atomic check-and-set claims.
#[derive(Debug, Default)]
pub struct ReminderLedger {
    sent: Mutex<HashSet<ReminderKey>>,
}

impl ReminderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a key. Returns `true` if this caller won the claim, `false`
    /// if the reminder was already sent (or claimed).
    pub fn claim(&self, key: &ReminderKey) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.clone())
    }

    /// Release a claim after a failed delivery so a later tick can retry.
    pub fn release(&self, key: &ReminderKey) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    pub fn contains(&self, key: &ReminderKey) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Save the ledger as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let entries: Vec<ReminderKey> = {
            let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
            let mut entries: Vec<ReminderKey> = sent.iter().cloned().collect();
            entries.sort_by(|a, b| {
                (&a.account_id, &a.course_id, a.tier.as_str())
                    .cmp(&(&b.account_id, &b.course_id, b.tier.as_str()))
            });
            entries
        };
        let json =
            serde_json::to_string_pretty(&entries).context("failed to serialize ledger")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write ledger to {}", path.display()))?;
        Ok(())
    }

    /// Load a ledger from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ledger from {}", path.display()))?;
        let entries: Vec<ReminderKey> =
            serde_json::from_str(&content).context("failed to parse ledger JSON")?;
        Ok(Self {
            sent: Mutex::new(entries.into_iter().collect()),
        })
    }

    /// Load a ledger, starting empty when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_json(path)
        } else {
            Ok(Self::new())
        }
    }
}
