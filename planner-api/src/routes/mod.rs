mod calendar;
mod content;
mod profile;
mod session;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(session::login))
        .route("/api/auth/signup", post(session::signup))
        .route("/api/auth/logout", post(session::logout))
        .route("/api/content", get(content::list).post(content::create))
        .route(
            "/api/content/:id",
            put(content::update).delete(content::remove),
        )
        .route("/api/calendar", get(calendar::month))
        .route("/api/calendar/fill", post(calendar::fill))
        .route("/api/profile", get(profile::read).put(profile::write))
        .fallback(|| async { (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))) })
        .with_state(state)
}

/// Every successful response carries the same envelope.
fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

#[cfg(test)]
mod testing {
    use std::sync::Arc;

    use tokio::time::Duration;

    use crate::auth::AuthClient;
    use crate::cache::{self, EventCache};
    use crate::state::AppState;
    use crate::store::memory::MemoryStore;

    pub fn state_with(store: MemoryStore) -> AppState {
        AppState {
            store: Arc::new(store),
            auth: Arc::new(AuthClient::new("http://127.0.0.1:1", "test-key")),
            cache: EventCache::new(cache::Config {
                enabled: false,
                ttl: Duration::from_secs(0),
            }),
        }
    }

    pub fn caching_state_with(store: MemoryStore) -> AppState {
        AppState {
            store: Arc::new(store),
            auth: Arc::new(AuthClient::new("http://127.0.0.1:1", "test-key")),
            cache: EventCache::new(cache::Config {
                enabled: true,
                ttl: Duration::from_secs(60),
            }),
        }
    }
}
