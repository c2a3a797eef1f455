use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub firestore_project_id: String,
    pub firestore_database: String,
    pub firestore_api_key: String,
    pub firestore_base_url: String,
    pub bookings_collection: String,
    pub gate_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            firestore_project_id: env::var("FIRESTORE_PROJECT_ID").unwrap_or_default(),
            firestore_database: env::var("FIRESTORE_DATABASE")
                .unwrap_or_else(|_| "(default)".to_string()),
            firestore_api_key: env::var("FIRESTORE_API_KEY").unwrap_or_default(),
            firestore_base_url: env::var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|_| "https://firestore.googleapis.com/v1".to_string()),
            bookings_collection: env::var("BOOKINGS_COLLECTION")
                .unwrap_or_else(|_| "bookings".to_string()),
            gate_password: env::var("GATE_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
        }
    }
}
