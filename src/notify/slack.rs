use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::classify::Alert;
use crate::error::{EngineError, Result};
use crate::notify::Notifier;

const ATTACHMENT_COLOR: &str = "#9733EE";
const ICON_EMOJI: &str = ":satellite:";

/// Delivers alerts to a Slack incoming webhook.
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
    username: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: String, username: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            webhook_url,
            username,
        })
    }

    fn payload(&self, alert: &Alert) -> serde_json::Value {
        json!({
            "channel": alert.channel,
            "username": self.username,
            "icon_emoji": ICON_EMOJI,
            "attachments": [{
                "color": ATTACHMENT_COLOR,
                "fields": [{
                    "title": alert.title,
                    "value": alert.body,
                    "short": "false",
                }],
            }],
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&self.payload(alert))
            .send()
            .await
            .map_err(|e| EngineError::Notify(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Notify(format!(
                "webhook returned {status}: {body}"
            )));
        }

        tracing::debug!(channel = %alert.channel, title = %alert.title, "alert delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert() -> Alert {
        Alert {
            title: "New gumtree item!".to_string(),
            body: "Road bike just became available in Fitzroy - https://example.com/item/1"
                .to_string(),
            channel: "#marketplace".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T0/B0/x"))
            .and(body_partial_json(json!({
                "channel": "#marketplace",
                "username": "argus",
                "icon_emoji": ":satellite:",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            SlackNotifier::new(format!("{}/services/T0/B0/x", server.uri()), "argus".into())
                .unwrap();
        notifier.notify(&alert()).await.unwrap();
    }

    #[tokio::test]
    async fn test_attachment_carries_title_and_body() {
        let notifier =
            SlackNotifier::new("https://hooks.slack.com/services/x".into(), "argus".into())
                .unwrap();
        let payload = notifier.payload(&alert());
        let field = &payload["attachments"][0]["fields"][0];
        assert_eq!(field["title"], "New gumtree item!");
        assert_eq!(payload["attachments"][0]["color"], "#9733EE");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "argus".into()).unwrap();
        let err = notifier.notify(&alert()).await.unwrap_err();
        assert!(matches!(err, EngineError::Notify(_)));
    }
}
