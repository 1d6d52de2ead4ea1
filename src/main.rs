use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pocketeer_core::config::Config;
use pocketeer_integrations::pocket::PocketClient;
use pocketeer_service::{AuthManager, AuthSettings, BookmarkCache};
use pocketeer_store::{KvStore, RedisStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("POCKETEER_CONFIG")
        .unwrap_or_else(|_| "pocketeer.toml".to_string());

    let config = Config::load(Path::new(&config_path)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load config");
        std::process::exit(1);
    });

    if config.pocket.consumer_key.is_empty() {
        tracing::error!("CONSUMER_KEY is not set");
        std::process::exit(1);
    }

    let store: Arc<dyn KvStore> = match RedisStore::connect(&config.redis).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to redis");
            std::process::exit(1);
        }
    };

    let api = match PocketClient::new(&config.pocket) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "failed to build pocket client");
            std::process::exit(1);
        }
    };

    let state = pocketeer_server::AppState {
        auth: Arc::new(AuthManager::new(
            api.clone(),
            store.clone(),
            AuthSettings::from_config(&config.pocket),
        )),
        bookmarks: Arc::new(BookmarkCache::new(
            api,
            store.clone(),
            Duration::from_secs(config.cache.ttl_secs),
        )),
        store,
    };

    tracing::info!(port = config.server.port, "pocketeer: starting");

    if let Err(e) =
        pocketeer_server::start_server(config.server.port, state, config.server.diagnostics).await
    {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
