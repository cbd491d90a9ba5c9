use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed waitlist signup. Created once after the payment has been
/// verified server-side; never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WaitlistEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub shopify_store_name: String,
    pub website_link: String,
    pub product_category: Vec<String>,
    pub payment_status: PaymentStatus,
    pub provider: PaymentProviderKind,
    /// Provider-side payment identifier. Unique: at most one entry per
    /// captured payment.
    pub payment_id: String,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProviderKind {
    Paypal,
    Razorpay,
}
