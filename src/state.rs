use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, warn};

use crate::auth::{JwtKeys, LocalIdentity, LogMailer, Mailer};
use crate::config::AppConfig;
use crate::store::{DocumentStore, InMemoryStore, PgDocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                let pg = PgDocumentStore::connect(url).await?;
                if let Err(e) = pg.migrate().await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres document store");
                Arc::new(pg) as Arc<dyn DocumentStore>
            }
            None => {
                warn!("DATABASE_URL not set; documents are kept in memory");
                Arc::new(InMemoryStore::new()) as Arc<dyn DocumentStore>
            }
        };

        Ok(Self::from_parts(store, config, Arc::new(LogMailer)))
    }

    pub fn from_parts(
        store: Arc<dyn DocumentStore>,
        config: Arc<AppConfig>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            config,
            mailer,
        }
    }

    /// Fresh, signed-out identity bound to this state's store and keys.
    pub fn identity(&self) -> LocalIdentity {
        LocalIdentity::new(
            self.store.clone(),
            JwtKeys::from_ref(self),
            self.mailer.clone(),
        )
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(crate::test_support::RecordingMailer::default()))
    }

    #[cfg(test)]
    pub fn fake_with(mailer: Arc<dyn Mailer>) -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: crate::test_support::test_jwt_config(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(InMemoryStore::new()), config, mailer)
    }
}
