//! Wires the signup wizard to the HTTP API across the payment redirect.

use thiserror::Error;

use crate::api::{ApiClient, ApiError, PaymentConfirmation, RazorpayOrderHandle, SubmissionPayload};
use crate::form::{parse_return_query, PaymentMarker, SessionStore, WaitlistForm};

/// Session key the verified payment confirmation is stored under,
/// alongside the form state.
pub const PAYMENT_KEY: &str = "waitlistPayment";

/// Where the browser gets pointed for the hosted approval page. Tests use
/// a capturing implementation.
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Navigator that records the last destination.
#[derive(Default)]
pub struct RecordingNavigator {
    pub destinations: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, url: &str) {
        self.destinations.push(url.to_string());
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0}")]
    Validation(String),

    #[error("payment has not been completed")]
    PaymentIncomplete,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct WaitlistFlow<S: SessionStore, N: Navigator> {
    pub form: WaitlistForm,
    session: S,
    navigator: N,
    api: ApiClient,
    payment: Option<PaymentConfirmation>,
}

impl<S: SessionStore, N: Navigator> WaitlistFlow<S, N> {
    pub fn new(api: ApiClient, session: S, navigator: N) -> Self {
        let mut form = WaitlistForm::restore(&session).unwrap_or_default();
        let payment: Option<PaymentConfirmation> = session
            .get(PAYMENT_KEY)
            .and_then(|saved| serde_json::from_str(&saved).ok());

        // A paid form without a restorable confirmation cannot be
        // submitted; the flag must not claim otherwise.
        if payment.is_none() {
            form.mark_unpaid();
        }

        Self {
            form,
            session,
            navigator,
            api,
            payment,
        }
    }

    fn persist_payment(&mut self) {
        if let Some(payment) = &self.payment {
            if let Ok(serialized) = serde_json::to_string(payment) {
                self.session.set(PAYMENT_KEY, &serialized);
            }
        }
    }

    /// The PayPal path: validate, persist, create the order, and send the
    /// browser to the approval page. The redirect will come back through
    /// `resume_from_redirect`.
    pub async fn pay_with_paypal(&mut self) -> Result<(), FlowError> {
        self.form
            .begin_payment(&mut self.session)
            .map_err(FlowError::Validation)?;

        let order = self.api.create_paypal_order().await?;
        self.navigator.navigate(&order.approval_url);
        Ok(())
    }

    /// The Razorpay path: validate, persist, create the order. The caller
    /// drives the checkout widget with the returned handle and reports the
    /// result through `complete_razorpay`.
    pub async fn start_razorpay(&mut self) -> Result<RazorpayOrderHandle, FlowError> {
        self.form
            .begin_payment(&mut self.session)
            .map_err(FlowError::Validation)?;

        Ok(self.api.create_razorpay_order().await?)
    }

    /// Report the checkout widget's completion claim for server-side
    /// verification. Only a verified claim marks the form paid.
    pub async fn complete_razorpay(
        &mut self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), FlowError> {
        let outcome = self
            .api
            .capture_razorpay(order_id, payment_id, signature)
            .await?;

        if !outcome.success {
            return Err(FlowError::Validation(
                outcome
                    .error
                    .unwrap_or_else(|| "Payment verification failed".to_string()),
            ));
        }

        self.payment = Some(PaymentConfirmation::Razorpay {
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
            signature: signature.to_string(),
        });
        self.form.mark_paid();
        self.form.save(&mut self.session);
        self.persist_payment();
        Ok(())
    }

    /// Handle the return navigation after the PayPal redirect. Consumes
    /// the `payment` marker from the query string; the caller is expected
    /// to clear it from the visible URL afterwards.
    pub fn resume_from_redirect(&mut self, query: &str) {
        let (marker, token) = parse_return_query(query);
        let Some(marker) = marker else {
            return;
        };

        self.form.resume(marker, &self.session);

        match marker {
            PaymentMarker::Success => {
                if let Some(order_id) = token {
                    self.payment = Some(PaymentConfirmation::Paypal { order_id });
                    self.persist_payment();
                } else if self.payment.is_none() {
                    // Without the order id there is nothing the service
                    // could verify at submission.
                    self.form.mark_unpaid();
                }
            }
            PaymentMarker::Cancel => {
                self.payment = None;
                self.session.remove(PAYMENT_KEY);
            }
        }
    }

    /// Final submission: disabled until the payment is confirmed. On
    /// success every piece of local state is cleared.
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        if !self.form.can_submit() {
            return Err(FlowError::PaymentIncomplete);
        }
        let payment = self.payment.clone().ok_or(FlowError::PaymentIncomplete)?;

        let fields = self.form.fields.clone();
        let payload = SubmissionPayload {
            name: fields.name,
            email: fields.email,
            shopify_store_name: fields.shopify_store_name,
            website_link: fields.website_link,
            product_category: fields.product_category,
            payment,
        };

        self.api.join_waitlist(&payload).await?;

        self.form.clear(&mut self.session);
        self.session.remove(PAYMENT_KEY);
        self.payment = None;
        Ok(())
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}
