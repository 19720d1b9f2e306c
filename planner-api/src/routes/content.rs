use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use log::info;
use planner_grid::EventStatus;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthedUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::ok;
use crate::state::AppState;
use crate::store::{ContentFilter, ContentUpdate, NewContent, PageRequest};

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl ListQuery {
    fn filter(&self) -> Result<ContentFilter, ApiError> {
        let status = match self.status.as_deref() {
            None | Some("all") => None,
            Some(raw) => Some(
                raw.parse::<EventStatus>()
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?,
            ),
        };

        Ok(ContentFilter {
            status,
            category: self.category.clone(),
            search: self.search.clone(),
        })
    }

    fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthedUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let filter = query.filter()?;
    let page = query.page_request();

    let result = state.store.list_content(&user.id, &filter, &page).await?;
    let total_pages = result.total.div_ceil(u64::from(page.limit));

    Ok(ok(json!({
        "content": result.records,
        "pagination": {
            "page": page.page,
            "limit": page.limit,
            "total": result.total,
            "total_pages": total_pages,
        },
    })))
}

#[derive(Deserialize)]
pub struct CreateBody {
    pub title: Option<String>,
    pub body: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub category_id: Option<String>,
    pub status: Option<EventStatus>,
    pub schedule_date: Option<NaiveDate>,
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(body): Json<CreateBody>,
) -> ApiResult<Json<Value>> {
    let title = body
        .title
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;

    let record = state
        .store
        .create_content(
            &user.id,
            NewContent {
                title,
                body: body.body,
                keywords: body.keywords,
                category_id: body.category_id,
                status: body.status,
                schedule_date: body.schedule_date,
            },
        )
        .await?;

    state.cache.invalidate_user(&user.id).await;
    info!("created content {} for {}", record.id, user.id);

    Ok(ok(json!({ "content": record })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<String>,
    Json(body): Json<ContentUpdate>,
) -> ApiResult<Json<Value>> {
    let record = state.store.update_content(&user.id, &id, body).await?;
    state.cache.invalidate_user(&user.id).await;

    Ok(ok(json!({ "content": record })))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.store.delete_content(&user.id, &id).await?;
    state.cache.invalidate_user(&user.id).await;
    info!("deleted content {} of {}", id, user.id);

    Ok(ok(json!({})))
}
