//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{FileId, ParseMode};
use tracing::{info, warn};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Resolve a file id to a direct download URL. Fails when the
    /// `getFile` lookup reports not-ok.
    pub async fn file_url(&self, file_id: FileId) -> Result<String, String> {
        let file = self.bot.get_file(file_id).await.map_err(|e| {
            let msg = format!("Failed to get file info: {e}");
            warn!("{}", msg);
            msg
        })?;

        // api_url always carries a trailing slash
        let url = format!(
            "{}file/bot{}/{}",
            self.bot.api_url(),
            self.bot.token(),
            file.path
        );
        info!("📥 Resolved file to {} ({} bytes)", file.path, file.meta.size);
        Ok(url)
    }

    /// Send a text message. Failures are logged and returned, but the
    /// pipeline treats them as non-fatal.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), String> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }

        request.await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }
}
