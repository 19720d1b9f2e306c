use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{AuthedUser, DEFAULT_ROLE};
use crate::error::ApiResult;
use crate::routes::ok;
use crate::state::AppState;
use crate::store::Profile;

pub async fn read(State(state): State<AppState>, user: AuthedUser) -> ApiResult<Json<Value>> {
    let profile = state
        .store
        .profile(&user.id)
        .await?
        .unwrap_or_else(|| Profile {
            id: user.id.clone(),
            role: Some(DEFAULT_ROLE.to_string()),
            ..Profile::default()
        });

    Ok(ok(json!({ "profile": profile })))
}

#[derive(Deserialize)]
pub struct ProfileBody {
    pub name: Option<String>,
    pub role: Option<String>,
}

pub async fn write(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(body): Json<ProfileBody>,
) -> ApiResult<Json<Value>> {
    let profile = state
        .store
        .upsert_profile(Profile {
            id: user.id,
            name: body.name,
            role: body.role,
            updated_at: Some(Utc::now()),
        })
        .await?;

    Ok(ok(json!({ "profile": profile })))
}
