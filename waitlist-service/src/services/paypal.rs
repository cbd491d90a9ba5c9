//! PayPal Checkout Orders API client.
//!
//! A single-capture order of the fixed signup fee: create the order with
//! the configured return/cancel URLs, then capture it when the payer comes
//! back from the hosted approval page.

use crate::config::PayPalConfig;
use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

#[derive(Clone)]
pub struct PayPalClient {
    client: Client,
    config: PayPalConfig,
}

#[derive(Debug, Deserialize)]
pub struct PayPalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<PayPalLink>,
}

#[derive(Debug, Deserialize)]
pub struct PayPalLink {
    pub rel: String,
    pub href: String,
}

impl PayPalOrder {
    /// The hosted page the payer must be sent to.
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.as_str())
    }
}

/// Result of a capture call: the provider body plus the settled outcome.
#[derive(Debug)]
pub struct PayPalCapture {
    pub order_id: String,
    pub completed: bool,
    pub body: serde_json::Value,
}

impl PayPalClient {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.secret.expose_secret().is_empty()
    }

    pub fn success_url(&self) -> &str {
        &self.config.success_url
    }

    pub fn failure_url(&self) -> &str {
        &self.config.failure_url
    }

    /// Create a single-capture order for the fixed signup fee.
    ///
    /// Credentials and redirect URLs are checked before any network call;
    /// missing configuration fails with a descriptive error.
    pub async fn create_order(&self) -> Result<PayPalOrder> {
        if !self.is_configured() {
            return Err(anyhow!(
                "PayPal credentials are missing. Check PAYPAL_CLIENT_ID and PAYPAL_SECRET."
            ));
        }
        if self.config.return_url.is_empty() || self.config.cancel_url.is_empty() {
            return Err(anyhow!(
                "Return or cancel URLs are missing. Check PAYPAL_RETURN_URL and PAYPAL_CANCEL_URL."
            ));
        }

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": self.config.currency,
                    "value": self.config.amount,
                }
            }],
            "application_context": {
                "return_url": self.config.return_url,
                "cancel_url": self.config.cancel_url,
            }
        });

        let url = format!("{}/v2/checkout/orders", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(self.config.secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(status = %status, body = %text, "PayPal create order response");

        if !status.is_success() {
            return Err(anyhow!("PayPal API error: {} - {}", status, text));
        }

        let order: PayPalOrder = serde_json::from_str(&text)?;
        tracing::info!(order_id = %order.id, "PayPal order created");
        Ok(order)
    }

    /// Capture an approved order.
    ///
    /// `completed` is true only when the call succeeded with HTTP 2xx and
    /// the response carries `status == "COMPLETED"`.
    pub async fn capture_order(&self, order_id: &str) -> Result<PayPalCapture> {
        if !self.is_configured() {
            return Err(anyhow!(
                "PayPal credentials are missing. Check PAYPAL_CLIENT_ID and PAYPAL_SECRET."
            ));
        }

        let url = format!(
            "{}/v2/checkout/orders/{}/capture",
            self.config.api_base_url, order_id
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(self.config.secret.expose_secret()))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(status = %status, body = %text, "PayPal capture response");

        if !status.is_success() {
            return Err(anyhow!("PayPal API error: {} - {}", status, text));
        }

        let body: serde_json::Value = serde_json::from_str(&text)?;
        let completed = body
            .get("status")
            .and_then(|s| s.as_str())
            .map(|s| s == "COMPLETED")
            .unwrap_or(false);

        Ok(PayPalCapture {
            order_id: order_id.to_string(),
            completed,
            body,
        })
    }

    /// Fetch an order, used to re-verify a claimed payment before a
    /// waitlist record is written.
    pub async fn get_order(&self, order_id: &str) -> Result<PayPalOrder> {
        if !self.is_configured() {
            return Err(anyhow!(
                "PayPal credentials are missing. Check PAYPAL_CLIENT_ID and PAYPAL_SECRET."
            ));
        }

        let url = format!("{}/v2/checkout/orders/{}", self.config.api_base_url, order_id);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.client_id, Some(self.config.secret.expose_secret()))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(anyhow!("Failed to fetch PayPal order: {} - {}", status, text));
        }

        let order: PayPalOrder = serde_json::from_str(&text)?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn test_config() -> PayPalConfig {
        PayPalConfig {
            client_id: "client_123".to_string(),
            secret: Secret::new("secret_456".to_string()),
            api_base_url: "https://api-m.paypal.com".to_string(),
            return_url: "https://example.com/paypal/capture-order".to_string(),
            cancel_url: "https://example.com/waitlist?payment=cancel".to_string(),
            success_url: "https://example.com/waitlist".to_string(),
            failure_url: "https://example.com/waitlist".to_string(),
            amount: "9.00".to_string(),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn approval_url_picks_the_approve_link() {
        let order: PayPalOrder = serde_json::from_value(serde_json::json!({
            "id": "5O190127TN364715T",
            "status": "CREATED",
            "links": [
                { "rel": "self", "href": "https://api-m.paypal.com/v2/checkout/orders/5O190127TN364715T", "method": "GET" },
                { "rel": "approve", "href": "https://www.paypal.com/checkoutnow?token=5O190127TN364715T", "method": "GET" }
            ]
        }))
        .unwrap();

        assert_eq!(
            order.approval_url(),
            Some("https://www.paypal.com/checkoutnow?token=5O190127TN364715T")
        );
    }

    #[test]
    fn missing_approve_link_yields_none() {
        let order = PayPalOrder {
            id: "x".to_string(),
            status: "CREATED".to_string(),
            links: vec![],
        };
        assert!(order.approval_url().is_none());
    }

    #[test]
    fn is_configured_requires_both_credentials() {
        assert!(PayPalClient::new(test_config()).is_configured());

        let mut config = test_config();
        config.secret = Secret::new(String::new());
        assert!(!PayPalClient::new(config).is_configured());
    }
}
