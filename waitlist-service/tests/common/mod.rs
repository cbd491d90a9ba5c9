use secrecy::Secret;
use std::sync::Arc;
use waitlist_service::config::{
    Config, DatabaseConfig, EmailConfig, PayPalConfig, RazorpayConfig, ServerConfig,
};
use waitlist_service::services::razorpay::compute_signature;
use waitlist_service::services::{MemoryWaitlistStore, MockEmailSender};
use waitlist_service::Application;
use wiremock::MockServer;

pub const TEST_RAZORPAY_SECRET: &str = "s3cret";
pub const SUCCESS_URL: &str = "https://site.test/waitlist";
pub const FAILURE_URL: &str = "https://site.test/waitlist";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub mailer: Arc<MockEmailSender>,
    pub paypal_server: MockServer,
    pub razorpay_server: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_mailer(Arc::new(MockEmailSender::new())).await
    }

    /// Spawn with empty provider credentials, for the fail-fast paths.
    pub async fn spawn_unconfigured() -> Self {
        let mut app = Self::prepare(Arc::new(MockEmailSender::new())).await;
        app.1.paypal.client_id = String::new();
        app.1.paypal.secret = Secret::new(String::new());
        app.1.razorpay.key_id = String::new();
        app.1.razorpay.key_secret = Secret::new(String::new());
        Self::launch(app).await
    }

    pub async fn spawn_with_mailer(mailer: Arc<MockEmailSender>) -> Self {
        let prepared = Self::prepare(mailer).await;
        Self::launch(prepared).await
    }

    async fn prepare(
        mailer: Arc<MockEmailSender>,
    ) -> (Arc<MockEmailSender>, Config, MockServer, MockServer) {
        let paypal_server = MockServer::start().await;
        let razorpay_server = MockServer::start().await;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            database: DatabaseConfig {
                url: Secret::new("mongodb://localhost:27017".to_string()),
                db_name: "unused-in-tests".to_string(),
            },
            paypal: PayPalConfig {
                client_id: "test_paypal_client".to_string(),
                secret: Secret::new("test_paypal_secret".to_string()),
                api_base_url: paypal_server.uri(),
                return_url: "https://site.test/paypal/capture-order".to_string(),
                cancel_url: "https://site.test/waitlist?payment=cancel".to_string(),
                success_url: SUCCESS_URL.to_string(),
                failure_url: FAILURE_URL.to_string(),
                amount: "9.00".to_string(),
                currency: "USD".to_string(),
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: Secret::new(TEST_RAZORPAY_SECRET.to_string()),
                api_base_url: razorpay_server.uri(),
                amount: 14900,
                currency: "INR".to_string(),
            },
            email: EmailConfig {
                api_key: Secret::new("test_resend_key".to_string()),
                api_base_url: "http://127.0.0.1:9".to_string(),
                from: "Test <no-reply@test.dev>".to_string(),
                enabled: true,
            },
            service_name: "waitlist-service-test".to_string(),
        };

        (mailer, config, paypal_server, razorpay_server)
    }

    async fn launch(
        (mailer, config, paypal_server, razorpay_server): (
            Arc<MockEmailSender>,
            Config,
            MockServer,
            MockServer,
        ),
    ) -> Self {
        let store = Arc::new(MemoryWaitlistStore::new());
        let app = Application::with_store(config, store, mailer.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Redirects stay observable: the PayPal return flow is asserted on
        // the Location header.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build test client");

        // Wait for the server to come up.
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            client,
            mailer,
            paypal_server,
            razorpay_server,
        }
    }
}

/// What a genuine Razorpay checkout would hand the client.
pub fn razorpay_signature(order_id: &str, payment_id: &str) -> String {
    compute_signature(&format!("{}|{}", order_id, payment_id), TEST_RAZORPAY_SECRET)
        .expect("Failed to compute test signature")
}
