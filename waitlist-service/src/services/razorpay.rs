//! Razorpay payment provider client.
//!
//! Implements order creation against the Orders API, payment lookup, and
//! HMAC-SHA256 signature verification for checkout confirmation.

use crate::config::RazorpayConfig;
use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody {
    /// Amount in smallest currency unit (paise for INR).
    amount: u64,
    currency: String,
    receipt: String,
}

/// Response from Razorpay order creation.
#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

/// Razorpay payment entity, as returned by `GET /payments/{id}`.
#[derive(Debug, Deserialize)]
pub struct RazorpayPayment {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub order_id: Option<String>,
    pub method: Option<String>,
    pub email: Option<String>,
}

impl RazorpayPayment {
    pub fn is_captured(&self) -> bool {
        self.status == "captured"
    }
}

/// Razorpay API error response.
#[derive(Debug, Deserialize)]
struct RazorpayApiError {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    code: String,
    description: String,
}

/// Checkout confirmation fields to verify.
#[derive(Debug)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check if Razorpay credentials are set.
    pub fn is_configured(&self) -> bool {
        !self.config.key_id.is_empty() && !self.config.key_secret.expose_secret().is_empty()
    }

    /// Create an order for the fixed configured amount.
    ///
    /// The amount and currency are never taken from the caller; the signup
    /// fee is a server-side constant.
    pub async fn create_order(&self) -> Result<RazorpayOrder> {
        if !self.is_configured() {
            return Err(anyhow!("Razorpay credentials not configured"));
        }

        let body = CreateOrderBody {
            amount: self.config.amount,
            currency: self.config.currency.clone(),
            receipt: format!("receipt_{}", unix_millis()),
        };

        let url = format!("{}/orders", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(status = %status, body = %text, "Razorpay create_order response");

        if status.is_success() {
            let order: RazorpayOrder = serde_json::from_str(&text)?;
            tracing::info!(
                order_id = %order.id,
                amount = order.amount,
                currency = %order.currency,
                "Razorpay order created"
            );
            Ok(order)
        } else {
            Err(anyhow!("Razorpay error: {}", describe_api_error(&text)))
        }
    }

    /// Fetch a payment by id, used to confirm it was actually captured.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment> {
        if !self.is_configured() {
            return Err(anyhow!("Razorpay credentials not configured"));
        }

        let url = format!("{}/payments/{}", self.config.api_base_url, payment_id);
        let response = self
            .client
            .get(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let payment: RazorpayPayment = serde_json::from_str(&text)?;
            Ok(payment)
        } else {
            Err(anyhow!(
                "Failed to fetch Razorpay payment: {}",
                describe_api_error(&text)
            ))
        }
    }

    /// Verify the checkout signature.
    ///
    /// The signature is `HMAC-SHA256(order_id + "|" + payment_id, key_secret)`,
    /// hex-encoded. Comparison is constant-time.
    pub fn verify_payment_signature(&self, verification: &PaymentVerification) -> Result<bool> {
        let payload = format!(
            "{}|{}",
            verification.razorpay_order_id, verification.razorpay_payment_id
        );

        let expected =
            compute_signature(&payload, self.config.key_secret.expose_secret())?;

        let is_valid: bool = expected
            .as_bytes()
            .ct_eq(verification.razorpay_signature.as_bytes())
            .into();

        if is_valid {
            tracing::info!(
                order_id = %verification.razorpay_order_id,
                payment_id = %verification.razorpay_payment_id,
                "Payment signature verified"
            );
        } else {
            tracing::warn!(
                order_id = %verification.razorpay_order_id,
                payment_id = %verification.razorpay_payment_id,
                "Payment signature verification failed"
            );
        }

        Ok(is_valid)
    }
}

/// Compute a hex-encoded HMAC-SHA256 signature.
pub fn compute_signature(payload: &str, secret: &str) -> Result<String> {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow!("Invalid key length"))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn describe_api_error(body: &str) -> String {
    match serde_json::from_str::<RazorpayApiError>(body) {
        Ok(err) => format!("{} - {}", err.error.code, err.error.description),
        Err(_) => body.to_string(),
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
