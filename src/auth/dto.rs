use serde::{Deserialize, Serialize};

use super::{jwt::TokenPair, repo_types::User, Account};
use crate::validation::{
    validate_email, validate_full_name, validate_password, validate_password_confirmation,
    validate_phone, Validation,
};

/// Sign-up form as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// First failing check wins, in form order.
    pub fn validate(&self) -> Validation {
        validate_full_name(&self.full_name)?;
        validate_email(self.email.trim())?;
        validate_password(&self.password)?;
        validate_password_confirmation(&self.password, &self.confirm_password)?;
        validate_phone(&self.phone_number)?;
        Ok(())
    }
}

/// Profile fields resent with the code; the server keeps no pending profile.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub account: Account,
}

/// `verification_sent: false` means the first code never left; call resend.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    #[serde(flatten)]
    pub session: AuthResponse,
    pub verification_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub first_login: time::OffsetDateTime,
    pub is_verified: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone_number: u.phone_number,
            first_login: u.first_login,
            is_verified: u.is_verified,
        }
    }
}
