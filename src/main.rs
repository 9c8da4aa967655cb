use std::sync::Arc;

use anyhow::Context;

use sms_categorizer::categorize::{Categorizer, CategoryCache};
use sms_categorizer::config::ServiceConfig;
use sms_categorizer::crm::HttpCrmClient;
use sms_categorizer::llm::anthropic_provider;
use sms_categorizer::rate_limiter::RateLimiter;
use sms_categorizer::webhook::{WebhookState, webhook_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("  export ANTHROPIC_API_KEY=sk-ant-...");
            std::process::exit(1);
        }
    };

    eprintln!("📨 SMS Categorizer v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!(
        "   Rate limit: {} requests / {:?}",
        config.rate_limit.requests, config.rate_limit.per
    );
    eprintln!("   Owners: {} configured", config.owner_keys.len());
    eprintln!("   CRM: {}", config.crm_base_url);
    eprintln!(
        "   Webhook: http://0.0.0.0:{}/api/categorize_sms",
        config.port
    );

    if config.owner_keys.is_empty() {
        tracing::warn!("BONZO_API_KEYS is empty; every request will be rejected as an unknown owner");
    }

    // ── LLM ──────────────────────────────────────────────────────────────
    let llm = anthropic_provider(&config.anthropic_api_key, &config.model)
        .context("Failed to create LLM provider")?;

    // ── Categorizer ──────────────────────────────────────────────────────
    // One limiter for the whole process, shared by every request.
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.requests,
        config.rate_limit.per,
    ));
    let categorizer = Categorizer::new(
        llm,
        limiter,
        CategoryCache::new(config.cache_capacity),
    );

    // ── HTTP server ──────────────────────────────────────────────────────
    let state = WebhookState {
        categorizer: Arc::new(categorizer),
        owner_keys: Arc::new(config.owner_keys),
        crm: Arc::new(HttpCrmClient::new(config.crm_base_url)),
    };
    let app = webhook_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "SMS categorizer listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("SMS categorizer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
