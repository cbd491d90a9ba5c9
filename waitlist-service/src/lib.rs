pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::Config;
use services::{
    EmailSender, MongoWaitlistStore, PayPalClient, RazorpayClient, ResendClient, WaitlistStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn WaitlistStore>,
    pub mailer: Arc<dyn EmailSender>,
    pub paypal: PayPalClient,
    pub razorpay: RazorpayClient,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build against MongoDB, the production path.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some("waitlist-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let store = MongoWaitlistStore::new(&db);
        store.init_indexes().await?;

        let mailer = ResendClient::new(config.email.clone());

        Self::with_store(config, Arc::new(store), Arc::new(mailer)).await
    }

    /// Build with explicit store and mailer implementations. Tests use
    /// this with the in-memory store and the mock sender.
    pub async fn with_store(
        config: Config,
        store: Arc<dyn WaitlistStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> anyhow::Result<Self> {
        let paypal = PayPalClient::new(config.paypal.clone());
        if !paypal.is_configured() {
            tracing::warn!("PayPal credentials not configured - PayPal checkout will be rejected");
        }

        let razorpay = RazorpayClient::new(config.razorpay.clone());
        if !razorpay.is_configured() {
            tracing::warn!(
                "Razorpay credentials not configured - Razorpay checkout will be rejected"
            );
        }

        let state = AppState {
            config: config.clone(),
            store,
            mailer,
            paypal,
            razorpay,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/paypal/create-order", post(handlers::paypal::create_order))
            .route(
                "/paypal/capture-order",
                post(handlers::paypal::capture_order).get(handlers::paypal::capture_redirect),
            )
            .route(
                "/razorpay/create-order",
                post(handlers::razorpay::create_order),
            )
            .route(
                "/razorpay/capture-order",
                post(handlers::razorpay::capture_order),
            )
            .route(
                "/waitlist",
                post(handlers::waitlist::join_waitlist).get(handlers::waitlist::list_waitlist),
            )
            .layer(CorsLayer::permissive())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state);

        // Port 0 binds a random port for tests.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
