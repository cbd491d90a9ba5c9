//! Thin HTTP client for the waitlist service endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalOrderHandle {
    pub approval_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayOrderHandle {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutcome {
    pub success: bool,
    pub payment_id: Option<String>,
    pub error: Option<String>,
}

/// Payment confirmation the service re-verifies before persisting. Kept in
/// the session between verification and submission, so it round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum PaymentConfirmation {
    #[serde(rename_all = "camelCase")]
    Razorpay {
        order_id: String,
        payment_id: String,
        signature: String,
    },
    #[serde(rename_all = "camelCase")]
    Paypal { order_id: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub shopify_store_name: String,
    pub website_link: String,
    pub product_category: Vec<String>,
    pub payment: PaymentConfirmation,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct NameItem {
    name: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn rejection(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => "request rejected".to_string(),
        };
        ApiError::Rejected { status, message }
    }

    pub async fn create_paypal_order(&self) -> Result<PayPalOrderHandle, ApiError> {
        let response = self
            .http
            .post(format!("{}/paypal/create-order", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn create_razorpay_order(&self) -> Result<RazorpayOrderHandle, ApiError> {
        let response = self
            .http
            .post(format!("{}/razorpay/create-order", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json().await?)
    }

    /// Ask the service to verify a checkout completion claim. A rejected
    /// claim comes back as a normal `CaptureOutcome` with `success: false`.
    pub async fn capture_razorpay(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<CaptureOutcome, ApiError> {
        let response = self
            .http
            .post(format!("{}/razorpay/capture-order", self.base_url))
            .json(&serde_json::json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": payment_id,
                "razorpay_signature": signature,
            }))
            .send()
            .await?;

        Ok(response.json().await?)
    }

    pub async fn join_waitlist(&self, payload: &SubmissionPayload) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/waitlist", self.base_url))
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    pub async fn fetch_names(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .http
            .get(format!("{}/waitlist", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let items: Vec<NameItem> = response.json().await?;
        Ok(items.into_iter().map(|item| item.name).collect())
    }
}
