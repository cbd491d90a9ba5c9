pub mod email;
pub mod paypal;
pub mod razorpay;
pub mod store;

pub use email::{EmailSender, MockEmailSender, ResendClient};
pub use paypal::PayPalClient;
pub use razorpay::RazorpayClient;
pub use store::{MemoryWaitlistStore, MongoWaitlistStore, StoreError, WaitlistStore};
