//! Gemini API client for transcription and note generation.
//!
//! Transcription runs two passes: recognition over the inline audio,
//! then a correction-only cleanup of the recognized text. The note is
//! a single pass over the corrected transcript.

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TRANSCRIBE_PROMPT: &str = "\
Produce the most ACCURATE transcription of the audio you can.
Rules:
- Keep the original language; when languages are mixed, keep the mix as spoken
- Keep foreign words in their own script (AI buddy, embedding, agent and the like)
- Never guess: when unsure, give two options in parentheses: (buddy/body)
- Drop filler sounds (\"uh\", \"um\") only where that does not change the meaning
- Preserve terms, names, numbers and titles
- When the speaker jumps around, keep natural paragraphs
Output only the transcription, no commentary.";

const CORRECTION_PROMPT: &str = "\
Fix obvious recognition errors in the text below.
Rules:
- Do NOT rephrase and do NOT shorten
- Fix only clear typos and misrecognized words
- Keep foreign words in their original script
- When in doubt, leave the text as it was or give two options in parentheses
Output only the corrected text.";

const NOTE_PROMPT: &str = "\
You turn the transcript of a voice note into a short structured note.

Write the note in exactly this format (headers verbatim):

Topics:
Most important:
Actions:
Implicit context:
Compliment:

Rules:
- Topics: 3-7 short topics (comma separated or as bullets)
- Most important: 3-7 bullets, no filler, substance only
- Actions: only when the recording names real actions, otherwise write \"—\"
- Implicit context: 2-5 bullets with implied motives, context or assumptions, but do NOT invent facts
- Compliment: 1-2 sentences, a warm compliment to the speaker's thinking, no gushing, to the point
- Add nothing beyond these sections.";

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    transcribe_model: String,
    note_model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    // keeps the output close to what was actually said
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, transcribe_model: String, note_model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key,
            base_url: GEMINI_API_URL.to_string(),
            transcribe_model,
            note_model,
            client,
        }
    }

    /// Point the client at a different API host. Tests use this to
    /// target a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Transcribe the audio behind `file_url` in two passes and return
    /// the corrected text.
    pub async fn transcribe(&self, file_url: &str, mime_type: &str) -> Result<String, String> {
        info!("🎙️ Transcribing audio ({mime_type})");

        let audio_b64 = self.download_base64(file_url).await?;

        let raw = self
            .generate_text(
                &self.transcribe_model,
                vec![
                    Part::text(TRANSCRIBE_PROMPT),
                    Part::inline_data(mime_type, audio_b64),
                ],
            )
            .await?;

        debug!("Pass one produced {} chars", raw.chars().count());

        let cleaned = self
            .generate_text(
                &self.transcribe_model,
                vec![Part::text(format!(
                    "{CORRECTION_PROMPT}\n\nText:\n\"\"\"{raw}\"\"\""
                ))],
            )
            .await?;

        Ok(cleaned.trim().to_string())
    }

    /// Turn a transcript into the five-section note.
    pub async fn make_note(&self, transcript: &str) -> Result<String, String> {
        info!("📋 Generating note");

        self.generate_text(
            &self.note_model,
            vec![Part::text(format!(
                "{NOTE_PROMPT}\n\nTranscript:\n\"\"\"{transcript}\"\"\""
            ))],
        )
        .await
    }

    async fn download_base64(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Failed to download audio: {e}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "Audio download failed with status {}",
                response.status()
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read audio body: {e}"))?;

        debug!("Downloaded {} bytes of audio", bytes.len());
        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }

    async fn generate_text(&self, model: &str, parts: Vec<Part>) -> Result<String, String> {
        let request = GenerateRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("HTTP error: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            return Err(format!("API error {status}: {body}"));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse response: {e}"))?;

        if let Some(error) = parsed.error {
            return Err(format!("Gemini error: {}", error.message));
        }

        let text = parsed
            .candidates
            .as_deref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or("Gemini returned empty response")?;

        Ok(text)
    }
}
