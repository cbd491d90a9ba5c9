//! Wire-level request/response types.
//!
//! Field casing follows the public API contract: the marketing site sends
//! camelCase, Razorpay checkout posts its own snake_case field names.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{PaymentProviderKind, WaitlistEntry};

/// Response after creating a PayPal order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalCreateOrderResponse {
    pub approval_url: String,
}

/// Body of the sandbox-style capture call.
#[derive(Debug, Deserialize)]
pub struct PayPalCaptureRequest {
    #[serde(rename = "orderID")]
    pub order_id: String,
}

/// Query parameters PayPal appends to the return redirect.
#[derive(Debug, Deserialize)]
pub struct PayPalReturnQuery {
    /// The order id, named `token` by PayPal.
    pub token: Option<String>,
}

/// Response after creating a Razorpay order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayCreateOrderResponse {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

/// Fields Razorpay checkout hands back to the client on completion.
#[derive(Debug, Deserialize)]
pub struct RazorpayCaptureRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Outcome of a Razorpay capture/verify call. Advisory only: nothing is
/// persisted at this step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResponse {
    pub fn ok(payment_id: String) -> Self {
        Self {
            success: true,
            payment_id: Some(payment_id),
            error: None,
        }
    }

    pub fn rejected(error: &str) -> Self {
        Self {
            success: false,
            payment_id: None,
            error: Some(error.to_string()),
        }
    }
}

/// Payment confirmation attached to a waitlist signup. The server
/// re-verifies this against the provider before writing the record.
#[derive(Debug, Clone, Deserialize, Serialize)]
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

impl PaymentConfirmation {
    pub fn provider(&self) -> PaymentProviderKind {
        match self {
            Self::Razorpay { .. } => PaymentProviderKind::Razorpay,
            Self::Paypal { .. } => PaymentProviderKind::Paypal,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinWaitlistRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "store name is required"))]
    pub shopify_store_name: String,
    #[validate(length(min = 1, message = "website link is required"))]
    pub website_link: String,
    #[validate(length(min = 1, message = "select at least one product category"))]
    pub product_category: Vec<String>,
    pub payment: PaymentConfirmation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWaitlistResponse {
    pub success: bool,
    pub waitlist_entry: WaitlistEntryView,
}

/// Public projection of a persisted entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntryView {
    pub name: String,
    pub email: String,
    pub shopify_store_name: String,
    pub website_link: String,
    pub product_category: Vec<String>,
    pub payment_status: crate::models::PaymentStatus,
}

impl From<WaitlistEntry> for WaitlistEntryView {
    fn from(entry: WaitlistEntry) -> Self {
        Self {
            name: entry.name,
            email: entry.email,
            shopify_store_name: entry.shopify_store_name,
            website_link: entry.website_link,
            product_category: entry.product_category,
            payment_status: entry.payment_status,
        }
    }
}

/// Item of the public `GET /waitlist` listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct WaitlistName {
    pub name: String,
}
