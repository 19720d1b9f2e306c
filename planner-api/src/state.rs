use std::sync::Arc;

use crate::auth::AuthClient;
use crate::cache::EventCache;
use crate::store::ContentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub auth: Arc<AuthClient>,
    pub cache: Arc<EventCache>,
}
