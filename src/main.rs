mod backend;
mod config;
mod error;
mod gate;
mod routes;
mod services;
mod session;
mod state;

use std::sync::Arc;

use crate::backend::{Backend, SupabaseClient};
use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    // Without provider credentials the server still starts; the gate passes
    // everything through and API handlers answer 503.
    let backend: Option<Arc<dyn Backend>> = match &config.backend {
        Some(backend_config) => match SupabaseClient::new(backend_config) {
            Ok(client) => {
                tracing::info!(url = %client.base_url(), "auth provider configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!(error = %e, "auth provider client init failed");
                None
            }
        },
        None => {
            tracing::warn!("SUPABASE_URL / SUPABASE_PUBLISHABLE_KEY not set; tenant gate disabled");
            None
        }
    };

    let state = state::AppState::new(backend, config.cookie_secure);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = %config.port, cookie_secure = config.cookie_secure, "tenant-gate listening");
    axum::serve(listener, app).await.expect("server failed");
}
