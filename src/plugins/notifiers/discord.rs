use crate::config::DiscordConfig;
use crate::plugins::traits::{NotificationMessage, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use std::time::Duration;
use url::Url;

const EMBED_COLOR: u32 = 0x00ff00;
const TITLE_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const FOOTER_LIMIT: usize = 2048;

/// Posts embeds to one Discord channel through the bot REST API.
pub struct DiscordNotifier {
    client: Client,
    config: DiscordConfig,
}

impl DiscordNotifier {
    pub fn new(config: DiscordConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(DiscordNotifier { client, config })
    }

    fn channel_url(&self) -> String {
        format!(
            "{}/channels/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.channel_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bot {}", self.config.token))
    }

    fn create_embed(&self, message: &NotificationMessage) -> serde_json::Value {
        let fields: Vec<_> = message
            .fields
            .iter()
            .map(|field| {
                json!({
                    "name": field.name,
                    "value": truncate(&field.value, FIELD_VALUE_LIMIT),
                    "inline": field.inline,
                })
            })
            .collect();

        let mut embed = json!({
            "title": truncate(&message.title, TITLE_LIMIT),
            "color": EMBED_COLOR,
            "timestamp": message.timestamp.to_rfc3339(),
            "fields": fields,
            "footer": { "text": truncate(&message.source, FOOTER_LIMIT) },
        });

        // Discord rejects embeds whose url is not http(s).
        if is_web_url(&message.link) {
            embed["url"] = json!(message.link);
        }

        embed
    }

    fn create_payload(&self, message: &NotificationMessage) -> serde_json::Value {
        json!({ "embeds": [self.create_embed(message)] })
    }

    async fn check_status(&self, response: Response, action: &str) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Notifier {
            notifier: self.name().to_string(),
            message: format!("{} failed with HTTP {}: {}", action, status.as_u16(), truncate(&body, 200)),
        })
    }
}

fn is_web_url(link: &str) -> bool {
    Url::parse(link).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit - 1).collect();
    cut.push('…');
    cut
}

#[async_trait]
impl NotifierPlugin for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn test_connection(&self) -> Result<()> {
        let response = self
            .authorized(self.client.get(self.channel_url()))
            .send()
            .await?;
        self.check_status(response, &format!("lookup of channel {}", self.config.channel_id))
            .await
    }

    async fn notify(&self, message: &NotificationMessage) -> Result<()> {
        let response = self
            .authorized(self.client.post(format!("{}/messages", self.channel_url())))
            .json(&self.create_payload(message))
            .send()
            .await?;
        self.check_status(response, "message delivery").await
    }
}
