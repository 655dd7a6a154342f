//! Shared state handed to every request handler.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::data::{Database, FeedbackStore, TaskStore};

#[derive(Clone)]
pub struct AppState {
    db: Database,
    config: Arc<Config>,
    auth: AuthService,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let auth = AuthService::new(db.clone(), config.session.ttl_hours);
        Self {
            db,
            config: Arc::new(config),
            auth,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn task_store(&self) -> TaskStore {
        TaskStore::new(self.db.clone())
    }

    pub fn feedback_store(&self) -> FeedbackStore {
        FeedbackStore::new(self.db.clone())
    }
}
