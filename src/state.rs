use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::models::AuthUser;
use crate::services::bookings::BookingFeeds;
use crate::services::store::DocumentStore;

/// One authenticated dashboard session: the user behind the bearer token
/// and the booking feeds scoped to it.
pub struct Session {
    pub user: AuthUser,
    pub feeds: Arc<BookingFeeds>,
}

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Mutex<HashMap<String, Session>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a session for `user` and returns its bearer token.
    pub fn open_session(&self, user: AuthUser) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let feeds = Arc::new(BookingFeeds::new(
            Arc::clone(&self.store),
            self.config.bookings_collection.clone(),
        ));
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), Session { user, feeds });
        token
    }
}
