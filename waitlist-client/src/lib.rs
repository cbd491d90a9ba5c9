//! Client-side flows for the paid-waitlist service.
//!
//! `form` is the multi-step signup wizard with its validation gates,
//! `controller` wires the wizard to the HTTP API across the payment
//! redirect, and `viewer` is the polling live-waitlist list.

pub mod api;
pub mod controller;
pub mod form;
pub mod viewer;

pub use api::{ApiClient, ApiError};
pub use controller::{Navigator, WaitlistFlow};
pub use form::{FormFields, MemorySession, PaymentMarker, SessionStore, WaitlistForm};
pub use viewer::LiveWaitlistViewer;
