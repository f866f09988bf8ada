//! Console notifier for local runs and dry runs.

use async_trait::async_trait;

use coursetrack_core::traits::{Notifier, ReminderNotice};

/// Notifier that logs reminders instead of delivering them. Never fails.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, notice: &ReminderNotice) -> anyhow::Result<()> {
        tracing::info!(
            tier = %notice.tier,
            account = %notice.account_id,
            email = %notice.email,
            course = notice.course_title.as_deref().unwrap_or("-"),
            link = %notice.link,
            "reminder (console)"
        );
        Ok(())
    }
}
