use serde::{Deserialize, Serialize};

/// The authenticated professional. Only `uid` drives queries; the email is
/// carried for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}
