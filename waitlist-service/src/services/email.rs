//! Welcome-email sender.
//!
//! Production implementation talks to the Resend HTTP API; a mock sender
//! backs the tests and counts sends.

use crate::config::EmailConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email sending is not enabled")]
    NotEnabled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Send error: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError>;

    fn is_enabled(&self) -> bool;
}

pub struct ResendClient {
    client: Client,
    config: EmailConfig,
}

impl ResendClient {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

fn welcome_html(name: &str) -> String {
    format!(
        "<h1>Welcome, {name}!</h1>\
         <p>Thank you for joining the Kridha Virtual Try-On waitlist!</p>\
         <p>As a special offer, we're providing you with <strong>6 months of free access</strong> \
         to Kridha Virtual Try-On for Shopify store owners, including a Beautiful Premium Template.</p>\
         <p>We'll keep you updated on your waitlist status.</p>\
         <p>Best regards,<br/>The Kridha Team</p>"
    )
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        if !self.config.enabled {
            return Err(EmailError::NotEnabled);
        }
        if self.config.api_key.expose_secret().is_empty() {
            return Err(EmailError::Configuration(
                "Resend API key is missing. Check RESEND_API_KEY.".to_string(),
            ));
        }

        let body = json!({
            "from": self.config.from,
            "to": [to],
            "subject": "Welcome to Kridha Virtual Try-On Waitlist!",
            "html": welcome_html(name),
        });

        let url = format!("{}/emails", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EmailError::SendFailed(format!("{status} - {text}")));
        }

        tracing::info!(to = %to, "Welcome email sent");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock sender for tests.
pub struct MockEmailSender {
    fail: bool,
    send_count: AtomicU64,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self {
            fail: false,
            send_count: AtomicU64::new(0),
        }
    }

    /// A sender whose every send fails, for exercising the
    /// email-failure-is-not-fatal path.
    pub fn failing() -> Self {
        Self {
            fail: true,
            send_count: AtomicU64::new(0),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

impl Default for MockEmailSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send_welcome(&self, to: &str, _name: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::SendFailed("mock failure".to_string()));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);
        tracing::info!(to = %to, "[MOCK] Welcome email would be sent");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
