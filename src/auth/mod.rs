//! Identity: who is signed in, how they got there, and the profile written
//! after their email is verified.

use async_trait::async_trait;
use axum::Router;
use serde::Serialize;

use crate::{error::AppError, state::AppState};

mod claims;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod local;
pub mod mailer;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod dto;

pub use claims::{Claims, TokenKind};
pub use dto::SignupForm;
pub use extractors::{AuthUser, VerifiedUser};
pub use jwt::{JwtKeys, TokenPair};
pub use local::LocalIdentity;
pub use mailer::{LogMailer, Mailer};
pub use repo_types::User;
pub use services::{PendingSignup, SignupFlow, SignupStarted};

/// The one thing data access needs from identity.
pub trait CurrentUser: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// Signed-in identity as the identity service sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

#[async_trait]
pub trait IdentityService: CurrentUser {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account, AppError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AppError>;
    async fn sign_out(&self);
    /// Issue a fresh code for the signed-in account and mail it.
    async fn send_verification_email(&self) -> Result<(), AppError>;
    async fn confirm_verification(&self, code: &str) -> Result<(), AppError>;
    /// Re-read the signed-in account from the backend.
    async fn reload(&self) -> Result<Account, AppError>;
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
