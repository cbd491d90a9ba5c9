//! The multi-step signup wizard.
//!
//! Four steps: identity, store info, product categories, payment/submit.
//! Forward transitions are gated by field validation; backward ones are
//! unconditional. The whole state serializes into a session-scoped store
//! so it survives the full-page payment redirect.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Session key the form state is stored under.
pub const SESSION_KEY: &str = "waitlistFormData";

/// Last step index: the payment/submit step.
pub const PAYMENT_STEP: usize = 3;

/// Session-scoped string KV storage, the browser's sessionStorage shape.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

/// In-memory session, used in tests and headless runs.
#[derive(Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub shopify_store_name: String,
    pub website_link: String,
    pub product_category: Vec<String>,
}

/// Outcome marker carried back on the post-payment redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMarker {
    Success,
    Cancel,
}

/// Parse the return-redirect query string: the `payment` marker and the
/// provider order id (`token`), if present.
pub fn parse_return_query(query: &str) -> (Option<PaymentMarker>, Option<String>) {
    let mut marker = None;
    let mut token = None;

    for pair in query.trim_start_matches('?').split('&') {
        let mut parts = pair.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some("payment"), Some("success")) => marker = Some(PaymentMarker::Success),
            (Some("payment"), Some("cancel")) => marker = Some(PaymentMarker::Cancel),
            (Some("token"), Some(value)) if !value.is_empty() => {
                token = Some(value.to_string());
            }
            _ => {}
        }
    }

    (marker, token)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaitlistForm {
    pub fields: FormFields,
    step: usize,
    payment_initiated: bool,
    is_paid: bool,
    #[serde(skip)]
    error: Option<String>,
}

impl WaitlistForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn payment_initiated(&self) -> bool {
        self.payment_initiated
    }

    fn validate_step(&self, step: usize) -> Result<(), String> {
        match step {
            0 => {
                if self.fields.name.is_empty() || self.fields.email.is_empty() {
                    return Err("Please fill out your name and email.".to_string());
                }
                if !self.fields.email.contains('@') || !self.fields.email.contains('.') {
                    return Err("Please enter a valid email address.".to_string());
                }
            }
            1 => {
                if self.fields.shopify_store_name.is_empty() || self.fields.website_link.is_empty()
                {
                    return Err("Please fill out your store information.".to_string());
                }
                if !self.fields.website_link.contains('.') {
                    return Err("Please enter a valid website URL.".to_string());
                }
            }
            2 => {
                if self.fields.product_category.is_empty() {
                    return Err("Please select at least one product category.".to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Advance one step. Stays put and records the validation message when
    /// the current step's fields don't pass.
    pub fn next_step(&mut self) -> bool {
        match self.validate_step(self.step) {
            Ok(()) if self.step < PAYMENT_STEP => {
                self.step += 1;
                self.error = None;
                true
            }
            Ok(()) => false,
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    /// Go back one step, unconditionally.
    pub fn prev_step(&mut self) {
        self.step = self.step.saturating_sub(1);
        self.error = None;
    }

    /// Re-validate everything that gates the payment step.
    pub fn validate_all(&self) -> Result<(), String> {
        for step in 0..PAYMENT_STEP {
            self.validate_step(step)?;
        }
        Ok(())
    }

    /// Validate and persist before navigating away to the provider.
    pub fn begin_payment(&mut self, session: &mut dyn SessionStore) -> Result<(), String> {
        if let Err(message) = self.validate_all() {
            self.error = Some(message.clone());
            return Err(message);
        }

        self.payment_initiated = true;
        self.error = None;
        self.save(session);
        Ok(())
    }

    pub fn mark_paid(&mut self) {
        self.is_paid = true;
        self.payment_initiated = false;
        self.error = None;
    }

    /// Drop a paid claim that has no confirmation backing it.
    pub fn mark_unpaid(&mut self) {
        self.is_paid = false;
    }

    /// Restore after the redirect and apply the outcome marker.
    pub fn resume(&mut self, marker: PaymentMarker, session: &dyn SessionStore) {
        if let Some(saved) = session.get(SESSION_KEY) {
            if let Ok(restored) = serde_json::from_str::<WaitlistForm>(&saved) {
                self.fields = restored.fields;
            }
        }

        self.step = PAYMENT_STEP;
        self.payment_initiated = false;

        match marker {
            PaymentMarker::Success => {
                self.is_paid = true;
                self.error = None;
            }
            PaymentMarker::Cancel => {
                self.is_paid = false;
                self.error = Some("Payment was cancelled. Please try again.".to_string());
            }
        }
    }

    /// Submit stays disabled until the payment is confirmed.
    pub fn can_submit(&self) -> bool {
        self.is_paid
    }

    pub fn save(&self, session: &mut dyn SessionStore) {
        if let Ok(serialized) = serde_json::to_string(self) {
            session.set(SESSION_KEY, &serialized);
        }
    }

    pub fn restore(session: &dyn SessionStore) -> Option<Self> {
        session
            .get(SESSION_KEY)
            .and_then(|saved| serde_json::from_str(&saved).ok())
    }

    /// Reset everything after a successful submission.
    pub fn clear(&mut self, session: &mut dyn SessionStore) {
        *self = Self::default();
        session.remove(SESSION_KEY);
    }
}
