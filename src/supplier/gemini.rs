//! Word supplier backed by the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{FetchRequest, WordSupplier, finish_batch};
use crate::config::Difficulty;
use crate::error::SupplierError;
use crate::word::WordEntry;
use crate::{debug_log, info_log};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const BATCH_TEMPERATURE: f64 = 0.9;
const HINT_TEMPERATURE: f64 = 0.8;

/// Gemini-backed [`WordSupplier`].
pub struct GeminiSupplier {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiSupplier {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, SupplierError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SupplierError::MissingApiKey);
        }
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            api_key,
            model: model.into(),
            base_url: API_BASE.to_string(),
            http_client,
        })
    }

    /// Points the client at another endpoint, e.g. a local proxy.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }

    async fn generate(&self, body: &GenerateRequest) -> Result<String, SupplierError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SupplierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .first_text()
            .ok_or_else(|| SupplierError::Malformed("response has no text part".to_string()))
    }
}

#[async_trait]
impl WordSupplier for GeminiSupplier {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<WordEntry>, SupplierError> {
        info_log!(
            "Requesting {} {} words from {} ({} excluded)",
            request.count,
            request.difficulty,
            self.model,
            request.exclude_words.len()
        );
        let body = batch_request(request);
        let text = self.generate(&body).await?;
        debug_log!("Batch response: {}", text);
        let raw = parse_batch(&text)?;
        finish_batch(raw, request.count)
    }

    async fn tricky_hint(&self, entry: &WordEntry) -> Result<String, SupplierError> {
        let body = hint_request(entry);
        let text = self.generate(&body).await?;
        let hint = text.trim();
        if hint.is_empty() {
            return Err(SupplierError::Malformed("empty hint".to_string()));
        }
        Ok(hint.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.clone())
    }
}

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "short, very common words",
        Difficulty::Medium => "moderately common words of medium length",
        Difficulty::Hard => "long, rare or technical words",
    }
}

fn batch_request(request: &FetchRequest) -> GenerateRequest {
    let style = if request.rich_mode {
        "Words may be short multi-word phrases. Hints should be rich, playful riddles."
    } else {
        "Each word must be a single word. Hints should be one short sentence."
    };
    let avoid = if request.exclude_words.is_empty() {
        "none".to_string()
    } else {
        request.exclude_words.join(", ")
    };
    let system = format!(
        "You are a mischievous word game generator. Produce {count} unique word objects, \
         each slightly harder than the previous one, using {guidance}. {style} \
         Words must only contain letters, digits and spaces. \
         Hints must be misleading, suggesting a decoy word, while still subtly pointing to the \
         real word; never include the decoy or the real word in the hint. \
         Do not use any of these previously given words: {avoid}.",
        count = request.count,
        guidance = difficulty_guidance(request.difficulty),
    );
    let prompt = format!(
        "Generate {} words.\nWord theme: {}",
        request.count, request.instructions
    );

    GenerateRequest {
        contents: vec![Content::text(Some("user"), prompt)],
        system_instruction: Content::text(None, system),
        generation_config: json!({
            "temperature": BATCH_TEMPERATURE,
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string" },
                        "word": { "type": "string" },
                        "hint": { "type": "string" }
                    },
                    "required": ["category", "word", "hint"]
                }
            }
        }),
    }
}

fn hint_request(entry: &WordEntry) -> GenerateRequest {
    let system = "You are a mischievous game master. Write a single tricky hint for a word: \
                  it must strongly suggest a different decoy word while still containing a \
                  subtle, indirect clue to the real word. One short sentence. Never mention \
                  the decoy or the real word. Output only the hint.";
    GenerateRequest {
        contents: vec![Content::text(
            Some("user"),
            format!("The original word is: {}", entry.word),
        )],
        system_instruction: Content::text(None, system.to_string()),
        generation_config: json!({ "temperature": HINT_TEMPERATURE }),
    }
}

/// Parses the JSON array the model returns, tolerating a fenced code block.
fn parse_batch(text: &str) -> Result<Vec<WordEntry>, SupplierError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(|e| SupplierError::Malformed(e.to_string()))
}
