mod auth;
mod cache;
mod cli;
mod error;
mod routes;
mod state;
mod store;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::net::TcpListener;

use crate::auth::AuthClient;
use crate::cache::EventCache;
use crate::state::AppState;
use crate::store::RestStore;

/// Key the upstream backend expects on every request. Kept out of the CLI
/// so it never shows up in process listings.
const SERVICE_KEY_VAR: &str = "PLANNER_SERVICE_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let args = cli::parse(env::args().skip(1).collect());

    let service_key = env::var(SERVICE_KEY_VAR)
        .with_context(|| format!("`{SERVICE_KEY_VAR}` environment variable is not set"))?;

    let state = AppState {
        store: Arc::new(RestStore::new(&args.upstream, &service_key)),
        auth: Arc::new(AuthClient::new(&args.upstream, &service_key)),
        cache: EventCache::new(cache::Config {
            enabled: args.enable_cache,
            ttl: args.cache_ttl,
        }),
    };

    let listener = TcpListener::bind(args.address).await?;
    info!("listening at http://{}", args.address);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "planner_api=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}
