use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use planner_grid::{Event, EventStatus};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("record not found")]
    NotFound,

    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Request(err.to_string())
    }
}

/// A row of the remote `content` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub status: EventStatus,
    #[serde(default)]
    pub schedule_date: Option<NaiveDate>,
    #[serde(default)]
    pub learning_time: Option<u32>,
}

impl ContentRecord {
    /// Scheduled rows become calendar events; unscheduled ones have no
    /// place on the grid.
    pub fn to_event(&self) -> Option<Event> {
        Some(Event {
            id: self.id.clone(),
            title: self.title.clone(),
            date: self.schedule_date?,
            status: self.status,
            duration: self.learning_time.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub status: Option<EventStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// One-based page request.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.limit
    }
}

pub struct ContentPage {
    pub records: Vec<ContentRecord>,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NewContent {
    pub title: String,
    pub body: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub category_id: Option<String>,
    pub status: Option<EventStatus>,
    pub schedule_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_time: Option<u32>,
}

/// The narrow surface this service needs from the remote table store.
/// Query semantics stay upstream; implementations only forward filters.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn events_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Event>, StoreError>;

    async fn list_content(
        &self,
        user_id: &str,
        filter: &ContentFilter,
        page: &PageRequest,
    ) -> Result<ContentPage, StoreError>;

    async fn create_content(
        &self,
        user_id: &str,
        new: NewContent,
    ) -> Result<ContentRecord, StoreError>;

    async fn update_content(
        &self,
        user_id: &str,
        id: &str,
        update: ContentUpdate,
    ) -> Result<ContentRecord, StoreError>;

    async fn delete_content(&self, user_id: &str, id: &str) -> Result<(), StoreError>;

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, StoreError>;
}

/// Client for a PostgREST-style table endpoint.
pub struct RestStore {
    base: String,
    key: String,
    http: reqwest::Client,
}

impl RestStore {
    pub fn new(base: &str, key: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{table}", self.base))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

#[async_trait]
impl ContentStore for RestStore {
    async fn events_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Event>, StoreError> {
        debug!("fetching events of {user_id} between {from} and {to}");

        let user = format!("eq.{user_id}");
        let gte = format!("gte.{from}");
        let lte = format!("lte.{to}");

        let records: Vec<ContentRecord> = self
            .request(Method::GET, "content")
            .query(&[
                ("select", "*"),
                ("user_id", user.as_str()),
                ("schedule_date", gte.as_str()),
                ("schedule_date", lte.as_str()),
                ("order", "schedule_date.asc"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(records.iter().filter_map(ContentRecord::to_event).collect())
    }

    async fn list_content(
        &self,
        user_id: &str,
        filter: &ContentFilter,
        page: &PageRequest,
    ) -> Result<ContentPage, StoreError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
        ];

        if let Some(status) = filter.status {
            query.push(("status", format!("eq.{status}")));
        }

        if let Some(category) = &filter.category {
            query.push(("category_id", format!("eq.{category}")));
        }

        if let Some(search) = &filter.search {
            query.push((
                "or",
                format!("(title.ilike.*{search}*,body.ilike.*{search}*)"),
            ));
        }

        let offset = page.offset();
        let response = self
            .request(Method::GET, "content")
            .query(&query)
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", offset, offset + page.limit - 1))
            .header("Prefer", "count=exact")
            .send()
            .await?
            .error_for_status()?;

        // `Content-Range: 0-9/57`; the trailing figure is the total count.
        let total_raw = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.rsplit('/').next())
            .map(str::to_string);

        let records: Vec<ContentRecord> = response.json().await?;
        let total = total_raw
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(records.len() as u64);

        Ok(ContentPage { records, total })
    }

    async fn create_content(
        &self,
        user_id: &str,
        new: NewContent,
    ) -> Result<ContentRecord, StoreError> {
        let row = serde_json::json!({
            "user_id": user_id,
            "title": new.title,
            "body": new.body,
            "keywords": new.keywords.unwrap_or_default(),
            "category_id": new.category_id,
            "status": new.status.unwrap_or_default(),
            "schedule_date": new.schedule_date,
        });

        let mut created: Vec<ContentRecord> = self
            .request(Method::POST, "content")
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        created
            .pop()
            .ok_or_else(|| StoreError::Decode("empty insert response".to_string()))
    }

    async fn update_content(
        &self,
        user_id: &str,
        id: &str,
        update: ContentUpdate,
    ) -> Result<ContentRecord, StoreError> {
        let mut updated: Vec<ContentRecord> = self
            .request(Method::PATCH, "content")
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{user_id}")),
            ])
            .header("Prefer", "return=representation")
            .json(&update)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        updated.pop().ok_or(StoreError::NotFound)
    }

    async fn delete_content(&self, user_id: &str, id: &str) -> Result<(), StoreError> {
        let deleted: Vec<ContentRecord> = self
            .request(Method::DELETE, "content")
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{user_id}")),
            ])
            .header("Prefer", "return=representation")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if deleted.is_empty() {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let mut profiles: Vec<Profile> = self
            .request(Method::GET, "profiles")
            .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(profiles.pop())
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut upserted: Vec<Profile> = self
            .request(Method::POST, "profiles")
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[profile])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        upserted
            .pop()
            .ok_or_else(|| StoreError::Decode("empty upsert response".to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn record(id: &str, user_id: &str, title: &str, status: EventStatus) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: None,
            keywords: Vec::new(),
            category_id: None,
            status,
            schedule_date: NaiveDate::from_ymd_opt(2025, 7, 2),
            learning_time: Some(45),
        }
    }

    #[test]
    fn unscheduled_rows_are_not_events() {
        let mut row = record("a", "u1", "title", EventStatus::Draft);
        row.schedule_date = None;
        assert!(row.to_event().is_none());
    }

    #[test]
    fn event_duration_defaults_to_zero() {
        let mut row = record("a", "u1", "title", EventStatus::Draft);
        row.learning_time = None;
        assert_eq!(row.to_event().unwrap().duration, 0);
    }

    #[tokio::test]
    async fn listing_is_paginated_and_counts_the_full_result() {
        let store = MemoryStore::with_content(
            (0..25)
                .map(|i| record(&format!("id-{i}"), "u1", "title", EventStatus::Draft))
                .collect(),
        );

        let page = store
            .list_content(
                "u1",
                &ContentFilter::default(),
                &PageRequest { page: 3, limit: 10 },
            )
            .await
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.records.len(), 5);
        assert_eq!(page.records[0].id, "id-20");
    }

    #[tokio::test]
    async fn search_matches_title_or_body() {
        let mut with_body = record("b", "u1", "unrelated", EventStatus::Draft);
        with_body.body = Some("all about Rust".to_string());

        let store = MemoryStore::with_content(vec![
            record("a", "u1", "Rust guide", EventStatus::Draft),
            with_body,
            record("c", "u1", "other", EventStatus::Draft),
            record("d", "u2", "Rust too", EventStatus::Draft),
        ]);

        let filter = ContentFilter {
            search: Some("rust".to_string()),
            ..ContentFilter::default()
        };

        let page = store
            .list_content("u1", &filter, &PageRequest { page: 1, limit: 10 })
            .await
            .unwrap();

        let ids: Vec<_> = page.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn status_filter_narrows_the_listing() {
        let store = MemoryStore::with_content(vec![
            record("a", "u1", "one", EventStatus::Published),
            record("b", "u1", "two", EventStatus::Draft),
        ]);

        let filter = ContentFilter {
            status: Some(EventStatus::Published),
            ..ContentFilter::default()
        };

        let page = store
            .list_content("u1", &filter, &PageRequest { page: 1, limit: 10 })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].id, "a");
    }

    #[tokio::test]
    async fn events_between_is_user_scoped_and_window_bounded() {
        let mut outside = record("late", "u1", "august", EventStatus::Scheduled);
        outside.schedule_date = NaiveDate::from_ymd_opt(2025, 8, 1);

        let store = MemoryStore::with_content(vec![
            record("a", "u1", "mine", EventStatus::Scheduled),
            record("b", "u2", "theirs", EventStatus::Scheduled),
            outside,
        ]);

        let events = store
            .events_between(
                "u1",
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "a");
    }

    #[tokio::test]
    async fn deleting_anothers_record_is_not_found() {
        let store =
            MemoryStore::with_content(vec![record("a", "u1", "mine", EventStatus::Draft)]);

        assert!(matches!(
            store.delete_content("u2", "a").await,
            Err(StoreError::NotFound)
        ));
        store.delete_content("u1", "a").await.unwrap();
    }
}
