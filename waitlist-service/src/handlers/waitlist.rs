//! Waitlist signup and public listing handlers.
//!
//! The signup re-verifies the claimed payment against the provider before
//! writing the record, and the provider payment id is stored under a
//! unique key, so a retried submit cannot double-insert.

use axum::{extract::State, http::StatusCode, Json};
use mongodb::bson::DateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        JoinWaitlistRequest, JoinWaitlistResponse, PaymentConfirmation, WaitlistEntryView,
        WaitlistName,
    },
    error::AppError,
    models::{PaymentStatus, WaitlistEntry},
    services::{razorpay::PaymentVerification, StoreError},
    AppState,
};

/// Re-verify the payment the client claims to have completed and return
/// the provider-side payment identifier to key the record on.
async fn verify_payment(
    state: &AppState,
    payment: &PaymentConfirmation,
) -> Result<String, AppError> {
    match payment {
        PaymentConfirmation::Razorpay {
            order_id,
            payment_id,
            signature,
        } => {
            let verification = PaymentVerification {
                razorpay_order_id: order_id.clone(),
                razorpay_payment_id: payment_id.clone(),
                razorpay_signature: signature.clone(),
            };

            let is_valid = state
                .razorpay
                .verify_payment_signature(&verification)
                .map_err(|e| {
                    tracing::error!(error = %e, "Signature verification error");
                    AppError::BadRequest(anyhow::anyhow!("Payment verification failed"))
                })?;

            if !is_valid {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invalid payment signature"
                )));
            }

            let fetched = state.razorpay.fetch_payment(payment_id).await.map_err(|e| {
                tracing::error!(payment_id = %payment_id, error = %e, "Failed to fetch payment");
                AppError::BadRequest(anyhow::anyhow!("Payment verification failed"))
            })?;

            if !fetched.is_captured() {
                return Err(AppError::BadRequest(anyhow::anyhow!("Payment not captured")));
            }

            Ok(payment_id.clone())
        }
        PaymentConfirmation::Paypal { order_id } => {
            let order = state.paypal.get_order(order_id).await.map_err(|e| {
                tracing::error!(order_id = %order_id, error = %e, "Failed to fetch PayPal order");
                AppError::BadRequest(anyhow::anyhow!("Payment verification failed"))
            })?;

            if order.status != "COMPLETED" {
                return Err(AppError::BadRequest(anyhow::anyhow!("Payment not captured")));
            }

            Ok(order_id.clone())
        }
    }
}

/// Join the waitlist: verify the payment, persist the entry, send the
/// welcome email.
pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(payload): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<JoinWaitlistResponse>), AppError> {
    payload.validate()?;

    let payment_id = verify_payment(&state, &payload.payment).await?;
    let provider = payload.payment.provider();

    let entry = WaitlistEntry {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email,
        shopify_store_name: payload.shopify_store_name,
        website_link: payload.website_link,
        product_category: payload.product_category,
        payment_status: PaymentStatus::Completed,
        provider,
        payment_id,
        created_at: DateTime::now(),
    };

    let entry = state.store.insert(entry).await.map_err(|e| match e {
        StoreError::DuplicatePayment => {
            AppError::Conflict(anyhow::anyhow!("This payment has already been used to sign up"))
        }
        StoreError::Backend(err) => {
            tracing::error!(error = %err, "Failed to persist waitlist entry");
            AppError::DatabaseError(anyhow::anyhow!("Failed to join waitlist"))
        }
    })?;

    // A captured payment with a persisted record but no email still counts
    // as a signup; the failure is logged, not surfaced.
    if let Err(e) = state.mailer.send_welcome(&entry.email, &entry.name).await {
        tracing::error!(email = %entry.email, error = %e, "Failed to send welcome email");
    }

    tracing::info!(name = %entry.name, "Waitlist entry created");

    Ok((
        StatusCode::CREATED,
        Json(JoinWaitlistResponse {
            success: true,
            waitlist_entry: WaitlistEntryView::from(entry),
        }),
    ))
}

/// Public listing: completed entries' names in insertion order.
pub async fn list_waitlist(
    State(state): State<AppState>,
) -> Result<Json<Vec<WaitlistName>>, AppError> {
    let entries = state.store.list_completed().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch waitlist");
        AppError::DatabaseError(anyhow::anyhow!("Failed to fetch waitlist"))
    })?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| WaitlistName { name: entry.name })
            .collect(),
    ))
}
