//! Outbound transport seam and the Discord implementation
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{CapsuleError, Result};
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Sends rendered text to a recipient.
///
/// A single fallible call; implementations own their own timeout.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, text: &str) -> Result<()>;
}

/// Delivers capsules as Discord channel messages
pub struct DiscordNotifier {
    http: Arc<Http>,
    send_timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, send_timeout: Duration) -> Self {
        Self { http, send_timeout }
    }
}

/// Recipients are stored as decimal channel ids
pub fn parse_channel_id(recipient: &str) -> Result<ChannelId> {
    recipient
        .parse::<u64>()
        .map(ChannelId)
        .map_err(|_| CapsuleError::notification(format!("invalid channel id '{recipient}'")))
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, recipient: &str, text: &str) -> Result<()> {
        let channel_id = parse_channel_id(recipient)?;

        match timeout(self.send_timeout, channel_id.say(&self.http, text)).await {
            Ok(Ok(message)) => {
                debug!("Delivered message {} to channel {channel_id}", message.id);
                Ok(())
            }
            Ok(Err(e)) => Err(CapsuleError::notification(e.to_string())),
            Err(_) => Err(CapsuleError::notification(format!(
                "send to {channel_id} timed out after {}s",
                self.send_timeout.as_secs()
            ))),
        }
    }
}
