//! Fakes shared by unit tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    auth::{JwtKeys, Mailer},
    config::JwtConfig,
    store::{Document, DocumentStore, Query, StoreError},
};

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test".into(),
        issuer: "test".into(),
        audience: "test".into(),
        ttl_minutes: 5,
        refresh_ttl_minutes: 60,
    }
}

pub fn test_keys() -> JwtKeys {
    JwtKeys::from_config(&test_jwt_config())
}

/// Keeps every (email, code) it delivered. Refuses delivery while offline.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    offline: AtomicBool,
}

impl RecordingMailer {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("mail relay unreachable");
        }
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Backend that is always down.
pub struct OfflineStore;

#[async_trait]
impl DocumentStore for OfflineStore {
    fn new_id(&self) -> String {
        "offline".into()
    }

    async fn set(&self, _c: &str, _id: &str, _body: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("backend offline".into()))
    }

    async fn create(&self, _c: &str, _id: &str, _body: Value) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("backend offline".into()))
    }

    async fn get(&self, _c: &str, _id: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("backend offline".into()))
    }

    async fn query(&self, _c: &str, _q: &Query) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable("backend offline".into()))
    }

    async fn delete(&self, _c: &str, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("backend offline".into()))
    }
}
