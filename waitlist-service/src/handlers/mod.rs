pub mod paypal;
pub mod razorpay;
pub mod waitlist;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "waitlist-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
