use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{LookoutError, PostRecord, Result};

const EMBED_COLOR: u32 = 0x1DA1F2;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, post: &PostRecord) -> Result<()>;
}

pub struct DiscordWebhook {
    url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads the webhook URL from `DISCORD_WEBHOOK_URL`.
    pub fn from_env() -> Result<Self> {
        match std::env::var("DISCORD_WEBHOOK_URL") {
            Ok(url) if !url.trim().is_empty() => Ok(Self::new(url.trim())),
            _ => Err(LookoutError::Config("DISCORD_WEBHOOK_URL is not set".to_string())),
        }
    }
}

pub fn webhook_payload(post: &PostRecord) -> Value {
    let mut embed = json!({
        "color": EMBED_COLOR,
        "author": {
            "name": format!("{} • {}", post.author_name, post.author_handle),
            "url": post.content_url,
        },
        "description": post.text,
        "timestamp": post.timestamp,
        "footer": { "text": format!("Lookout via {}", post.source_instance) },
    });

    if let Some(media) = &post.media_url {
        embed["image"] = json!({ "url": media });
    }

    json!({
        "username": "Lookout",
        "embeds": [embed],
    })
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn deliver(&self, post: &PostRecord) -> Result<()> {
        tracing::info!(handle = %post.author_handle, "Sending post to Discord");

        let response = self
            .client
            .post(&self.url)
            .json(&webhook_payload(post))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LookoutError::Delivery(format!(
                "webhook returned HTTP {}",
                response.status().as_u16()
            )))
        }
    }
}
