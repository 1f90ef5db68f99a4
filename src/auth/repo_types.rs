use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const USERS: &str = "users";
pub const CREDENTIALS: &str = "credentials";
/// One document per normalized email, keyed by the email itself.
pub const EMAILS: &str = "emails";

/// Profile written once the email is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub first_login: OffsetDateTime,
    pub is_verified: bool,
    /// Only meaningful while a signup is pending; empty once stored.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub verification_code: String,
}

/// Identity-service record, kept apart from the public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub email_verified: bool,
    #[serde(default)]
    pub pending_code: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
