use async_trait::async_trait;

use crate::classify::Alert;
use crate::error::Result;

pub mod slack;

pub use slack::SlackNotifier;

/// Alert delivery capability. Failures here are the run's least important
/// ones: the runner logs them and still reports the change.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Fallback notifier for deployments without a webhook configured: alerts
/// land in the log instead of a channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        tracing::info!(
            "alert [{}] {}: {}",
            alert.channel,
            alert.title,
            alert.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let alert = Alert {
            title: "New item!".to_string(),
            body: "body".to_string(),
            channel: "#alert".to_string(),
        };
        assert!(LogNotifier.notify(&alert).await.is_ok());
    }
}
