//! PayPal order creation and capture handlers.
//!
//! Two capture surfaces exist: a JSON POST used by the sandbox flow, and
//! the GET the payer's browser hits when PayPal redirects back from the
//! hosted approval page. The GET variant never returns a body; the outcome
//! is communicated purely through the destination URL.

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use crate::{
    dtos::{PayPalCaptureRequest, PayPalCreateOrderResponse, PayPalReturnQuery},
    error::AppError,
    AppState,
};

/// Create an order for the fixed signup fee and hand back the approval URL.
pub async fn create_order(
    State(state): State<AppState>,
) -> Result<Json<PayPalCreateOrderResponse>, AppError> {
    tracing::info!("Initiating PayPal order creation");

    if !state.paypal.is_configured() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "PayPal credentials are missing. Check PAYPAL_CLIENT_ID and PAYPAL_SECRET."
        )));
    }

    let order = state.paypal.create_order().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create PayPal order");
        AppError::UpstreamError {
            message: "Failed to create PayPal order".to_string(),
            details: e.to_string(),
        }
    })?;

    let approval_url = order.approval_url().ok_or_else(|| {
        tracing::error!(order_id = %order.id, "No approval URL in PayPal response");
        AppError::UpstreamError {
            message: "Failed to create PayPal order".to_string(),
            details: "No approval URL returned from PayPal".to_string(),
        }
    })?;

    tracing::info!(order_id = %order.id, approval_url = %approval_url, "PayPal order created");

    Ok(Json(PayPalCreateOrderResponse {
        approval_url: approval_url.to_string(),
    }))
}

/// Capture an approved order and return the provider body (sandbox flow).
pub async fn capture_order(
    State(state): State<AppState>,
    Json(payload): Json<PayPalCaptureRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!(order_id = %payload.order_id, "Capturing PayPal order");

    let capture = state
        .paypal
        .capture_order(&payload.order_id)
        .await
        .map_err(|e| {
            tracing::error!(order_id = %payload.order_id, error = %e, "Failed to capture PayPal order");
            AppError::UpstreamError {
                message: "Failed to capture PayPal order".to_string(),
                details: e.to_string(),
            }
        })?;

    tracing::info!(
        order_id = %capture.order_id,
        completed = capture.completed,
        "PayPal capture finished"
    );

    Ok(Json(capture.body))
}

/// Return-redirect capture (live flow).
///
/// PayPal sends the payer here with the order id in the `token` query
/// parameter. Capture it server-side, then send the browser to the
/// configured success or cancel destination with a `payment` marker. The
/// success destination also carries the order id as `token`, which the
/// signup submission needs to reference the captured payment. Any failure
/// collapses to the cancel destination.
pub async fn capture_redirect(
    State(state): State<AppState>,
    Query(query): Query<PayPalReturnQuery>,
) -> Redirect {
    let cancel = marked(state.paypal.failure_url(), "cancel");

    let Some(order_id) = query.token else {
        tracing::warn!("PayPal return redirect without token parameter");
        return Redirect::to(&cancel);
    };

    match state.paypal.capture_order(&order_id).await {
        Ok(capture) if capture.completed => {
            tracing::info!(order_id = %order_id, "PayPal order captured, redirecting to success");
            let destination = format!(
                "{}&token={}",
                marked(state.paypal.success_url(), "success"),
                order_id
            );
            Redirect::to(&destination)
        }
        Ok(capture) => {
            tracing::warn!(
                order_id = %order_id,
                status = ?capture.body.get("status"),
                "PayPal capture did not complete"
            );
            Redirect::to(&cancel)
        }
        Err(e) => {
            tracing::error!(order_id = %order_id, error = %e, "PayPal capture failed");
            Redirect::to(&cancel)
        }
    }
}

/// Append the `payment=` marker the form controller resumes on.
fn marked(destination: &str, outcome: &str) -> String {
    let separator = if destination.contains('?') { '&' } else { '?' };
    format!("{destination}{separator}payment={outcome}")
}

#[cfg(test)]
mod tests {
    use super::marked;

    #[test]
    fn marker_appends_with_correct_separator() {
        assert_eq!(
            marked("https://example.com/waitlist", "success"),
            "https://example.com/waitlist?payment=success"
        );
        assert_eq!(
            marked("https://example.com/waitlist?ref=x", "cancel"),
            "https://example.com/waitlist?ref=x&payment=cancel"
        );
    }
}
