//! Audio detection over inbound Telegram messages.
//!
//! The webhook payload is duck-typed; this module resolves it once at
//! the boundary into an [`AudioAttachment`] or nothing.

use mime::Mime;
use teloxide::types::{FileId, Message};

/// MIME type assumed when nothing better is declared. Telegram voice
/// messages are ogg/opus.
pub const FALLBACK_MIME: &str = "audio/ogg";

/// Which attachment on the message carried the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioKind {
    Voice,
    Audio,
    VideoNote,
    AudioDocument,
}

/// A transcribable attachment, resolved from the update boundary.
#[derive(Debug, Clone)]
pub struct AudioAttachment {
    pub file_id: FileId,
    pub mime_type: String,
    pub kind: AudioKind,
}

fn is_audio(mime: &Mime) -> bool {
    mime.type_() == mime::AUDIO
}

/// MIME type for the message's media, by fixed precedence: voice, then
/// an audio's declared type, then video-note, then an audio document's
/// declared type, then the fallback.
pub fn detect_mime_type(msg: &Message) -> String {
    if msg.voice().is_some() {
        return FALLBACK_MIME.to_string();
    }
    if let Some(audio) = msg.audio()
        && let Some(mime) = &audio.mime_type
    {
        return mime.to_string();
    }
    if msg.video_note().is_some() {
        // mp4 container; the model extracts the audio track fine
        return "video/mp4".to_string();
    }
    if let Some(doc) = msg.document()
        && let Some(mime) = &doc.mime_type
        && is_audio(mime)
    {
        return mime.to_string();
    }
    FALLBACK_MIME.to_string()
}

/// Pick the transcribable attachment, if any. Documents only qualify
/// when they declare an `audio/*` type.
pub fn audio_attachment(msg: &Message) -> Option<AudioAttachment> {
    let (file_id, kind) = if let Some(voice) = msg.voice() {
        (voice.file.id.clone(), AudioKind::Voice)
    } else if let Some(audio) = msg.audio() {
        (audio.file.id.clone(), AudioKind::Audio)
    } else if let Some(note) = msg.video_note() {
        (note.file.id.clone(), AudioKind::VideoNote)
    } else if let Some(doc) = msg.document()
        && doc.mime_type.as_ref().is_some_and(is_audio)
    {
        (doc.file.id.clone(), AudioKind::AudioDocument)
    } else {
        return None;
    };

    Some(AudioAttachment {
        file_id,
        mime_type: detect_mime_type(msg),
        kind,
    })
}
