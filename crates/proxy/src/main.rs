use dotenv::dotenv;
use edu_admin_proxy::config::{ProxyConfig, BACKEND_URL_ENV};
use edu_admin_proxy::ProxyServer;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ProxyConfig::from_env();
    if config.backend_url.is_none() {
        warn!(
            "{} is not set, every route will answer a configuration error",
            BACKEND_URL_ENV
        );
    }

    ProxyServer::new(&config)?.run().await
}
