//! voicenote - a private Telegram webhook bot that turns voice messages
//! into transcripts and structured notes via the Gemini API.

pub mod config;
pub mod format;
pub mod gemini;
pub mod media;
pub mod pipeline;
pub mod telegram;
pub mod webhook;

pub use config::Config;
pub use gemini::GeminiClient;
pub use telegram::TelegramClient;
pub use webhook::AppState;
