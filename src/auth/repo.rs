use serde_json::{json, Value};

use super::repo_types::{Credential, User, CREDENTIALS, EMAILS, USERS};
use crate::store::{DocumentStore, Query, StoreError};

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(body)?)
}

/// Look up the credential registered for an already normalized email.
pub async fn find_credential_by_email(
    store: &dyn DocumentStore,
    email: &str,
) -> Result<Option<Credential>, StoreError> {
    let query = Query::new().where_eq("email", email).limit(1);
    store
        .query(CREDENTIALS, &query)
        .await?
        .into_iter()
        .next()
        .map(|doc| decode(doc.body))
        .transpose()
}

/// Reserve `email` for `user_id`. `false` when another account holds it.
pub async fn claim_email(
    store: &dyn DocumentStore,
    email: &str,
    user_id: &str,
) -> Result<bool, StoreError> {
    store
        .create(EMAILS, email, json!({ "user_id": user_id }))
        .await
}

pub async fn find_credential(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<Credential>, StoreError> {
    store.get(CREDENTIALS, id).await?.map(decode).transpose()
}

pub async fn save_credential(
    store: &dyn DocumentStore,
    credential: &Credential,
) -> Result<(), StoreError> {
    store
        .set(CREDENTIALS, &credential.id, serde_json::to_value(credential)?)
        .await
}

pub async fn find_user(store: &dyn DocumentStore, id: &str) -> Result<Option<User>, StoreError> {
    store.get(USERS, id).await?.map(decode).transpose()
}

/// The profile is keyed by the identity id.
pub async fn save_user(store: &dyn DocumentStore, user: &User) -> Result<(), StoreError> {
    store.set(USERS, &user.id, serde_json::to_value(user)?).await
}
