use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Delivery seam for alert notifications. The evaluator depends on this
/// trait so sweeps can run against a recording sink in tests.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), anyhow::Error>;
}

pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        TelegramSink { bot }
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), anyhow::Error> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
