use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use log::info;
use planner_grid::{month_grid, month_span, statistics, EventStatus};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthedUser;
use crate::cache::MonthKey;
use crate::error::{ApiError, ApiResult};
use crate::routes::ok;
use crate::state::AppState;
use crate::store::NewContent;

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
    /// Return the 42-cell day grid instead of the raw event list.
    #[serde(default)]
    pub grid: bool,
}

pub async fn month(
    State(state): State<AppState>,
    user: AuthedUser,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<Value>> {
    let (from, to) = month_span(query.year, query.month).ok_or_else(|| {
        ApiError::BadRequest(format!("invalid month: {}-{}", query.year, query.month))
    })?;

    let key = MonthKey {
        user_id: user.id.clone(),
        year: query.year,
        month: query.month,
    };

    let events = match state.cache.get(&key).await {
        Some(events) => events,
        None => {
            let fetched = state.store.events_between(&user.id, from, to).await?;
            state.cache.insert(key, fetched).await
        }
    };

    if query.grid {
        return Ok(ok(json!({ "grid": month_grid(from, &events) })));
    }

    Ok(ok(json!({
        "events": &*events,
        "statistics": statistics(&events),
    })))
}

#[derive(Deserialize)]
pub struct FillBody {
    pub keywords: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
}

/// Bulk-schedules one placeholder item per keyword, the "Fill Calendar"
/// action of the dashboard.
pub async fn fill(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(body): Json<FillBody>,
) -> ApiResult<Json<Value>> {
    let keywords = body
        .keywords
        .filter(|keywords| !keywords.is_empty())
        .ok_or_else(|| ApiError::BadRequest("keywords are required".to_string()))?;

    let mut generated = 0u32;
    let mut failure = None;

    for keyword in &keywords {
        let result = state
            .store
            .create_content(
                &user.id,
                NewContent {
                    title: keyword.clone(),
                    keywords: Some(keywords.clone()),
                    status: Some(EventStatus::Scheduled),
                    schedule_date: body.start_date,
                    ..NewContent::default()
                },
            )
            .await;

        match result {
            Ok(_) => generated += 1,
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    // A partially applied fill already changed the upstream month views,
    // so cached copies must go even when the error is surfaced.
    if generated > 0 {
        state.cache.invalidate_user(&user.id).await;
    }

    if let Some(err) = failure {
        return Err(err.into());
    }

    info!("filled calendar of {} with {generated} items", user.id);

    Ok(ok(json!({
        "generated": generated,
        "workflow_id": format!("workflow-{}", Utc::now().timestamp_millis()),
    })))
}
