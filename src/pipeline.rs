//! The request pipeline: authorize, resolve, transcribe, note, reply.
//!
//! Runs detached from the webhook response. Telegram has already been
//! acknowledged by the time this starts, so every failure ends here.

use std::fmt;
use std::sync::Arc;

use teloxide::types::{ChatId, ParseMode, Update, UpdateKind};
use tracing::{error, info};

use crate::format::{MAX_CHUNK_LEN, escape_markdown, header_chunks};
use crate::media::audio_attachment;
use crate::webhook::AppState;

const TRANSCRIPT_HEADER: &str = "📝 *Transcription*\n";
const NOTE_HEADER: &str = "📋 *Note*\n";

const PRIVATE_REPLY: &str = "Sorry, this bot is private 🙂";
const NO_MEDIA_REPLY: &str =
    "Send a voice message, an audio file or a video note and I'll reply with a 📝 transcript and a 📋 note.";
const ACK_REPLY: &str = "⏳ Got it. Transcribing as carefully as I can…";
const NOTE_PROGRESS_REPLY: &str = "🧠 Building the note…";

/// How a run ended when nothing failed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Transcript and note were produced and sent.
    Completed,
    /// The update carried no message payload.
    Ignored,
    /// Sender did not match the allowed user id; a refusal was sent.
    Unauthorized,
    /// No transcribable attachment; a hint was sent.
    NoMedia,
}

/// A downstream failure, tagged with the stage that raised it.
#[derive(Debug)]
pub enum PipelineError {
    FileUrl(String),
    Transcribe(String),
    Note(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileUrl(msg) => write!(f, "file resolution failed: {msg}"),
            Self::Transcribe(msg) => write!(f, "transcription failed: {msg}"),
            Self::Note(msg) => write!(f, "note generation failed: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Detached top level. Catches everything `run` raises; the sender
/// sees nothing beyond messages already sent.
pub async fn process(state: Arc<AppState>, update: Update) {
    match run(&state, &update).await {
        Ok(outcome) => info!("Pipeline finished: {outcome:?}"),
        Err(e) => error!("Pipeline failed: {e}"),
    }
}

pub async fn run(state: &AppState, update: &Update) -> Result<PipelineOutcome, PipelineError> {
    let msg = match &update.kind {
        UpdateKind::Message(msg) | UpdateKind::EditedMessage(msg) => msg,
        _ => return Ok(PipelineOutcome::Ignored),
    };

    let chat_id = msg.chat.id;
    let sender = msg.from.as_ref().map(|user| user.id);

    if !state.config.is_allowed(sender) {
        info!("Refusing sender {sender:?} in chat {chat_id}");
        state.telegram.send_message(chat_id, PRIVATE_REPLY, None).await.ok();
        return Ok(PipelineOutcome::Unauthorized);
    }

    let Some(attachment) = audio_attachment(msg) else {
        state.telegram.send_message(chat_id, NO_MEDIA_REPLY, None).await.ok();
        return Ok(PipelineOutcome::NoMedia);
    };

    info!(
        "🎙️ {:?} in chat {chat_id} ({})",
        attachment.kind, attachment.mime_type
    );

    state.telegram.send_message(chat_id, ACK_REPLY, None).await.ok();

    let file_url = state
        .telegram
        .file_url(attachment.file_id.clone())
        .await
        .map_err(PipelineError::FileUrl)?;

    let transcript = state
        .gemini
        .transcribe(&file_url, &attachment.mime_type)
        .await
        .map_err(PipelineError::Transcribe)?;

    state
        .telegram
        .send_message(chat_id, NOTE_PROGRESS_REPLY, None)
        .await
        .ok();

    let note = state
        .gemini
        .make_note(&transcript)
        .await
        .map_err(PipelineError::Note)?;

    send_chunked(state, chat_id, TRANSCRIPT_HEADER, &transcript).await;
    send_chunked(state, chat_id, NOTE_HEADER, &note).await;

    Ok(PipelineOutcome::Completed)
}

/// Escape, split and send one output. A failed chunk does not stop the
/// rest.
async fn send_chunked(state: &AppState, chat_id: ChatId, header: &str, text: &str) {
    for chunk in header_chunks(header, &escape_markdown(text), MAX_CHUNK_LEN) {
        state
            .telegram
            .send_message(chat_id, &chunk, Some(ParseMode::MarkdownV2))
            .await
            .ok();
    }
}
