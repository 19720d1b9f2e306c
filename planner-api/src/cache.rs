use std::collections::HashMap;
use std::sync::Arc;

use planner_grid::Event;
use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration};

/// One cached month view per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub user_id: String,
    pub year: i32,
    pub month: u32,
}

pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

/// TTL cache of fetched event lists. Entries expire through a spawned
/// sleep task and are dropped eagerly when a user's content changes.
pub struct EventCache {
    enabled: bool,
    ttl: Duration,
    inner: RwLock<HashMap<MonthKey, Arc<Vec<Event>>>>,
}

impl EventCache {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    pub async fn insert(self: &Arc<Self>, key: MonthKey, events: Vec<Event>) -> Arc<Vec<Event>> {
        let arcd = Arc::new(events);
        if !self.enabled {
            return arcd;
        }

        self.inner
            .write()
            .await
            .insert(key.clone(), Arc::clone(&arcd));

        let self_clone = Arc::clone(self);
        task::spawn(async move {
            sleep(self_clone.ttl).await;
            self_clone.inner.write().await.remove(&key);
        });

        arcd
    }

    pub async fn get(&self, key: &MonthKey) -> Option<Arc<Vec<Event>>> {
        if !self.enabled {
            return None;
        }

        self.inner.read().await.get(key).map(Arc::clone)
    }

    /// Drops every cached month of one user. Called after any write to
    /// that user's content so the calendar never serves stale data.
    pub async fn invalidate_user(&self, user_id: &str) {
        if !self.enabled {
            return;
        }

        self.inner
            .write()
            .await
            .retain(|key, _| key.user_id != user_id);
    }
}
