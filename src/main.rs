//! Propulsa worker — entry point.
//!
//! Wires the Supabase store and the Gemini client into the pipeline context
//! and serves the trigger surface.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use propulsa::api::server;
use propulsa::api::types::ApiContext;
use propulsa::config::{self, Config};
use propulsa::pipeline::gemini::GeminiClient;
use propulsa::pipeline::PipelineContext;
use propulsa::store::SupabaseStore;

#[tokio::main]
async fn main() {
    // .env is optional; real deployments inject the environment directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("propulsa=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };

    tracing::info!(
        version = config::APP_VERSION,
        model = %config.gemini_model,
        "Starting {}",
        config::APP_NAME
    );

    let store = Arc::new(SupabaseStore::new(
        &config.supabase_url,
        &config.supabase_service_key,
    ));
    let llm = Arc::new(GeminiClient::new(
        &config.gemini_model,
        &config.gemini_api_key,
    ));
    let pipeline = Arc::new(PipelineContext::new(store, llm, config.llm_timeout));
    let ctx = ApiContext::new(pipeline, config.worker_auth_token.clone());

    if let Err(error) = server::serve(ctx, config.port).await {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }
}
