use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{dto::SignupForm, repo, repo_types::User, IdentityService};
use crate::{
    error::AppError,
    store::DocumentStore,
    validation::{validate_full_name, validate_phone, validate_verification_code},
};

/// Profile captured at sign-up, held by the caller until the code is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
}

/// Result of [`SignupFlow::begin`]. The account exists even when the first
/// code was not delivered; [`SignupFlow::resend`] retries delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupStarted {
    pub pending: PendingSignup,
    pub code_sent: bool,
}

/// Sign-up, emailed code, then the stored profile.
pub struct SignupFlow {
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn DocumentStore>,
}

impl SignupFlow {
    pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn DocumentStore>) -> Self {
        Self { identity, store }
    }

    #[instrument(skip_all)]
    pub async fn begin(&self, form: &SignupForm) -> Result<SignupStarted, AppError> {
        form.validate()?;
        let account = self.identity.sign_up(&form.email, &form.password).await?;
        let code_sent = match self.identity.send_verification_email().await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %account.uid, error = %e, "first verification code not delivered");
                false
            }
        };

        Ok(SignupStarted {
            pending: PendingSignup {
                user_id: account.uid,
                email: account.email,
                full_name: form.full_name.trim().to_string(),
                phone_number: form.phone_number.trim().to_string(),
            },
            code_sent,
        })
    }

    pub async fn resend(&self) -> Result<(), AppError> {
        self.identity.send_verification_email().await
    }

    /// Writes the `users` record. Nothing is written before this succeeds.
    #[instrument(skip_all, fields(user_id = %pending.user_id))]
    pub async fn confirm(&self, pending: &PendingSignup, code: &str) -> Result<User, AppError> {
        validate_verification_code(code)?;
        validate_full_name(&pending.full_name)?;
        validate_phone(&pending.phone_number)?;

        self.identity.confirm_verification(code).await?;
        let account = self.identity.reload().await?;
        if !account.email_verified {
            return Err(AppError::Verification("Please verify your email first"));
        }

        let user = User {
            id: account.uid,
            email: account.email,
            name: pending.full_name.clone(),
            phone_number: pending.phone_number.clone(),
            first_login: OffsetDateTime::now_utc(),
            is_verified: true,
            verification_code: String::new(),
        };
        repo::save_user(self.store.as_ref(), &user).await?;
        info!(user_id = %user.id, "user profile created");
        Ok(user)
    }
}
