//! Razorpay order creation and capture/verify handlers.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    dtos::{CaptureResponse, RazorpayCaptureRequest, RazorpayCreateOrderResponse},
    error::AppError,
    services::razorpay::PaymentVerification,
    AppState,
};

/// Create an order for the fixed signup fee.
pub async fn create_order(
    State(state): State<AppState>,
) -> Result<Json<RazorpayCreateOrderResponse>, AppError> {
    if !state.razorpay.is_configured() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "Razorpay credentials are missing. Check RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET."
        )));
    }

    let order = state.razorpay.create_order().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create Razorpay order");
        AppError::UpstreamError {
            message: "Failed to create Razorpay order".to_string(),
            details: e.to_string(),
        }
    })?;

    Ok(Json(RazorpayCreateOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
    }))
}

/// Verify a payment the checkout widget claims to have completed.
///
/// Two independent checks, in order: the HMAC signature (defends against a
/// forged client-side success claim), then a provider-side status fetch
/// (defends against replaying a valid signature for a payment that was
/// never captured). The response is advisory; nothing is persisted here.
pub async fn capture_order(
    State(state): State<AppState>,
    Json(payload): Json<RazorpayCaptureRequest>,
) -> (StatusCode, Json<CaptureResponse>) {
    let verification = PaymentVerification {
        razorpay_order_id: payload.razorpay_order_id.clone(),
        razorpay_payment_id: payload.razorpay_payment_id.clone(),
        razorpay_signature: payload.razorpay_signature.clone(),
    };

    match state.razorpay.verify_payment_signature(&verification) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CaptureResponse::rejected("Invalid payment signature")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Signature verification error");
            return (
                StatusCode::BAD_REQUEST,
                Json(CaptureResponse::rejected("Payment verification failed")),
            );
        }
    }

    match state
        .razorpay
        .fetch_payment(&payload.razorpay_payment_id)
        .await
    {
        Ok(payment) if payment.is_captured() => {
            tracing::info!(
                order_id = %payload.razorpay_order_id,
                payment_id = %payload.razorpay_payment_id,
                "Payment verified successfully"
            );
            (
                StatusCode::OK,
                Json(CaptureResponse::ok(payload.razorpay_payment_id)),
            )
        }
        Ok(payment) => {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status,
                "Payment not captured"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(CaptureResponse::rejected("Payment not captured")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Payment verification error");
            (
                StatusCode::BAD_REQUEST,
                Json(CaptureResponse::rejected("Payment verification failed")),
            )
        }
    }
}
