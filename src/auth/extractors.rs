use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{claims::TokenKind, jwt::JwtKeys, repo, CurrentUser};
use crate::{error::AppError, state::AppState};

/// Identity taken from a bearer access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl CurrentUser for AuthUser {
    fn current_user_id(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthenticated)?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(AppError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_kind(token, TokenKind::Access).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            AppError::Unauthenticated
        })?;

        Ok(AuthUser(claims.sub))
    }
}

/// Bearer identity whose email has been confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser(pub String);

impl CurrentUser for VerifiedUser {
    fn current_user_id(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let credential = repo::find_credential(state.store.as_ref(), &user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        if !credential.email_verified {
            warn!(%user_id, "unverified account rejected");
            return Err(AppError::Forbidden("Please verify your email first"));
        }
        Ok(VerifiedUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::IdentityService;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/meals");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn accepts_access_tokens() {
        let state = AppState::fake();
        let pair = JwtKeys::from_ref(&state).issue_pair("user-9").unwrap();
        let mut parts = parts(Some(&format!("Bearer {}", pair.access_token)));

        let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user, AuthUser("user-9".into()));
        assert_eq!(user.current_user_id().as_deref(), Some("user-9"));
    }

    #[tokio::test]
    async fn rejects_missing_header_refresh_tokens_and_garbage() {
        let state = AppState::fake();
        let pair = JwtKeys::from_ref(&state).issue_pair("user-9").unwrap();

        for header in [
            None,
            Some("Basic abc".to_string()),
            Some("Bearer nope".to_string()),
            Some(format!("Bearer {}", pair.refresh_token)),
        ] {
            let mut parts = parts(header.as_deref());
            let err = AuthUser::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Unauthenticated));
        }
    }

    #[tokio::test]
    async fn verified_user_requires_a_confirmed_email() {
        let state = AppState::fake();
        let identity = state.identity();
        let account = identity.sign_up("a@b.com", "Abc123!@").await.unwrap();
        let header = format!("Bearer {}", identity.issue_tokens().unwrap().access_token);

        let err = VerifiedUser::from_request_parts(&mut parts(Some(&header)), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut credential = repo::find_credential(state.store.as_ref(), &account.uid)
            .await
            .unwrap()
            .unwrap();
        credential.email_verified = true;
        repo::save_credential(state.store.as_ref(), &credential)
            .await
            .unwrap();

        let user = VerifiedUser::from_request_parts(&mut parts(Some(&header)), &state)
            .await
            .unwrap();
        assert_eq!(user, VerifiedUser(account.uid));
    }

    #[tokio::test]
    async fn verified_user_rejects_tokens_for_unknown_accounts() {
        let state = AppState::fake();
        let pair = JwtKeys::from_ref(&state).issue_pair("ghost").unwrap();
        let header = format!("Bearer {}", pair.access_token);

        let err = VerifiedUser::from_request_parts(&mut parts(Some(&header)), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }
}
