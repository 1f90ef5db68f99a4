use async_trait::async_trait;
use tracing::info;

/// Delivers verification codes to a mailbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()>;
}

/// Development transport: the code goes to the log instead of an inbox.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        info!(%email, %code, "verification code issued");
        Ok(())
    }
}
