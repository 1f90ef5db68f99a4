use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    jwt::{JwtKeys, TokenPair},
    mailer::Mailer,
    password::{hash_password, verify_password},
    repo,
    repo_types::Credential,
    Account, CurrentUser, IdentityService,
};
use crate::{
    error::AppError,
    store::DocumentStore,
    validation::validate_email,
    verification,
};

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl From<&Credential> for Account {
    fn from(c: &Credential) -> Self {
        Self {
            uid: c.id.clone(),
            email: c.email.clone(),
            email_verified: c.email_verified,
        }
    }
}

/// Identity service hosted on the document store: argon2 credentials,
/// JWT sessions, codes delivered through a [`Mailer`].
pub struct LocalIdentity {
    store: Arc<dyn DocumentStore>,
    keys: JwtKeys,
    mailer: Arc<dyn Mailer>,
    session: RwLock<Option<Account>>,
}

impl LocalIdentity {
    pub fn new(store: Arc<dyn DocumentStore>, keys: JwtKeys, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            keys,
            mailer,
            session: RwLock::new(None),
        }
    }

    fn session(&self) -> Option<Account> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_session(&self, account: Option<Account>) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = account;
    }

    async fn signed_in_credential(&self) -> Result<Credential, AppError> {
        let account = self.session().ok_or(AppError::Unauthenticated)?;
        repo::find_credential(self.store.as_ref(), &account.uid)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    /// Rebuild the session for an id taken from a verified token.
    pub async fn resume(&self, user_id: &str) -> Result<Account, AppError> {
        let credential = repo::find_credential(self.store.as_ref(), user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        let account = Account::from(&credential);
        self.set_session(Some(account.clone()));
        Ok(account)
    }

    pub fn issue_tokens(&self) -> Result<TokenPair, AppError> {
        let account = self.session().ok_or(AppError::Unauthenticated)?;
        Ok(self.keys.issue_pair(&account.uid)?)
    }
}

impl CurrentUser for LocalIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.session().map(|account| account.uid)
    }
}

#[async_trait]
impl IdentityService for LocalIdentity {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        if repo::find_credential_by_email(self.store.as_ref(), &email)
            .await?
            .is_some()
        {
            warn!(%email, "email already registered");
            return Err(AppError::Conflict("Email already registered"));
        }

        let password_hash = hash_password(password)?;
        let id = self.store.new_id();
        if !repo::claim_email(self.store.as_ref(), &email, &id).await? {
            warn!(%email, "email claimed concurrently");
            return Err(AppError::Conflict("Email already registered"));
        }

        let credential = Credential {
            id,
            email,
            password_hash,
            email_verified: false,
            pending_code: None,
            created_at: OffsetDateTime::now_utc(),
        };
        repo::save_credential(self.store.as_ref(), &credential).await?;

        let account = Account::from(&credential);
        info!(user_id = %account.uid, email = %account.email, "account created");
        self.set_session(Some(account.clone()));
        Ok(account)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let email = normalize_email(email);
        let Some(credential) = repo::find_credential_by_email(self.store.as_ref(), &email).await?
        else {
            warn!(%email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &credential.password_hash)? {
            warn!(%email, user_id = %credential.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let account = Account::from(&credential);
        info!(user_id = %account.uid, "user logged in");
        self.set_session(Some(account.clone()));
        Ok(account)
    }

    async fn sign_out(&self) {
        if let Some(account) = self.session() {
            info!(user_id = %account.uid, "user signed out");
        }
        self.set_session(None);
    }

    #[instrument(skip(self))]
    async fn send_verification_email(&self) -> Result<(), AppError> {
        let mut credential = self.signed_in_credential().await?;
        let code = verification::generate();
        credential.pending_code = Some(code.clone());
        repo::save_credential(self.store.as_ref(), &credential).await?;

        self.mailer
            .send_verification_code(&credential.email, &code)
            .await?;
        info!(user_id = %credential.id, "verification code sent");
        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn confirm_verification(&self, code: &str) -> Result<(), AppError> {
        let mut credential = self.signed_in_credential().await?;
        let Some(expected) = credential.pending_code.as_deref() else {
            return Err(AppError::Verification("No verification code pending"));
        };
        if !verification::verify(code, expected) {
            warn!(user_id = %credential.id, "invalid verification code");
            return Err(AppError::Verification("Invalid verification code"));
        }

        credential.email_verified = true;
        credential.pending_code = None;
        repo::save_credential(self.store.as_ref(), &credential).await?;
        self.set_session(Some(Account::from(&credential)));
        info!(user_id = %credential.id, "email verified");
        Ok(())
    }

    async fn reload(&self) -> Result<Account, AppError> {
        let credential = self.signed_in_credential().await?;
        let account = Account::from(&credential);
        self.set_session(Some(account.clone()));
        Ok(account)
    }
}
