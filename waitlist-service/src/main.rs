use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waitlist_service::{config::Config, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,waitlist_service=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
