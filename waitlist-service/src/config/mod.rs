use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub paypal: PayPalConfig,
    pub razorpay: RazorpayConfig,
    pub email: EmailConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

/// PayPal REST credentials and the redirect URLs for the hosted checkout.
///
/// `return_url`/`cancel_url` are handed to PayPal when the order is created
/// and are where the payer lands after approving or abandoning the payment
/// (point `return_url` at `GET /paypal/capture-order`). `success_url` and
/// `failure_url` are where this service sends the browser once the capture
/// call has actually settled the outcome.
#[derive(Deserialize, Clone, Debug)]
pub struct PayPalConfig {
    pub client_id: String,
    pub secret: Secret<String>,
    pub api_base_url: String,
    pub return_url: String,
    pub cancel_url: String,
    pub success_url: String,
    pub failure_url: String,
    /// Major-unit amount as PayPal expects it, e.g. "9.00".
    pub amount: String,
    pub currency: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_base_url: String,
    /// Amount in the smallest currency unit (paise for INR).
    pub amount: u64,
    pub currency: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EmailConfig {
    pub api_key: Secret<String>,
    pub api_base_url: String,
    pub from: String,
    pub enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("WAITLIST_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("WAITLIST_SERVICE_PORT")
            .unwrap_or_else(|_| "3005".to_string())
            .parse()?;

        let db_url = env::var("WAITLIST_DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name =
            env::var("WAITLIST_DATABASE_NAME").unwrap_or_else(|_| "waitlist_db".to_string());

        let paypal = PayPalConfig {
            client_id: env::var("PAYPAL_CLIENT_ID").unwrap_or_default(),
            secret: Secret::new(env::var("PAYPAL_SECRET").unwrap_or_default()),
            api_base_url: env::var("PAYPAL_API_BASE_URL")
                .unwrap_or_else(|_| "https://api-m.paypal.com".to_string()),
            return_url: env::var("PAYPAL_RETURN_URL").unwrap_or_default(),
            cancel_url: env::var("PAYPAL_CANCEL_URL").unwrap_or_default(),
            success_url: env::var("PAYMENT_SUCCESS_URL").unwrap_or_default(),
            failure_url: env::var("PAYMENT_FAILURE_URL").unwrap_or_default(),
            amount: env::var("PAYPAL_AMOUNT").unwrap_or_else(|_| "9.00".to_string()),
            currency: env::var("PAYPAL_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
        };

        let razorpay = RazorpayConfig {
            key_id: env::var("RAZORPAY_KEY_ID").unwrap_or_default(),
            key_secret: Secret::new(env::var("RAZORPAY_KEY_SECRET").unwrap_or_default()),
            api_base_url: env::var("RAZORPAY_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string()),
            amount: env::var("RAZORPAY_AMOUNT")
                .unwrap_or_else(|_| "14900".to_string())
                .parse()?,
            currency: env::var("RAZORPAY_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        };

        let email = EmailConfig {
            api_key: Secret::new(env::var("RESEND_API_KEY").unwrap_or_default()),
            api_base_url: env::var("RESEND_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Kridha Team <no-reply@kridha.com>".to_string()),
            enabled: env::var("EMAIL_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        };

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            paypal,
            razorpay,
            email,
            service_name: "waitlist-service".to_string(),
        })
    }
}
