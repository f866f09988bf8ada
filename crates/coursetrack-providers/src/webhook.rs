//! Webhook notifier implementation.
//!
//! Posts each reminder as a JSON payload to a configured HTTP endpoint.
//! This is the production-shaped transport; SMTP delivery stays outside
//! the system boundary.

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use coursetrack_core::traits::{Notifier, ReminderNotice};

use crate::error::NotifierError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Notifier that delivers reminders to an HTTP endpoint.
pub struct WebhookNotifier {
    endpoint: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(endpoint: &str, auth_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            endpoint: endpoint.to_string(),
            auth_token,
            client,
        }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    tier: &'a str,
    account_id: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    course_title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    link: &'a str,
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip(self, notice), fields(tier = %notice.tier, account = %notice.account_id))]
    async fn send(&self, notice: &ReminderNotice) -> anyhow::Result<()> {
        let start = Instant::now();

        let payload = WebhookPayload {
            tier: notice.tier.as_str(),
            account_id: &notice.account_id,
            email: &notice.email,
            course_title: notice.course_title.as_deref(),
            due_date: notice.due_date.map(|d| d.to_rfc3339()),
            link: &notice.link,
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NotifierError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                NotifierError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifierError::ApiError { status, message }.into());
        }

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            "reminder delivered"
        );
        Ok(())
    }
}
