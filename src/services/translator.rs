// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Translation through an OpenAI-compatible chat completions API.

use crate::models::teleprompter::UploadedFile;
use crate::models::translation::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, TranslationReply,
    UNKNOWN_LANGUAGE,
};
use crate::services::extractor::{self, DocumentKind, ExtractError};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";

const SYSTEM_PROMPT: &str = "You are a translation engine. You translate exactly the text \
you are given, without adding, removing or inventing words, and you answer with a single \
JSON object and nothing else.";

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Translation service is not configured")]
    NotConfigured,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Could not extract content from file")]
    Extraction(#[source] ExtractError),
    #[error("Translation failed: {0}")]
    Upstream(String),
}

/// Configuration for the translation API.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl TranslatorConfig {
    /// Load translator configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("TRANSLATOR_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: env::var("TRANSLATOR_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("TRANSLATOR_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout_secs: env::var("TRANSLATOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

/// Sends text to the LLM and turns its reply into a [`TranslationReply`].
pub struct TranslationService {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl TranslationService {
    pub fn new(config: TranslatorConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if config.api_key.is_none() {
            tracing::warn!("TRANSLATOR_API_KEY not set, translation endpoints will return 503");
        }

        Ok(Self { client, config })
    }

    /// Translate pasted text.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationReply, TranslationError> {
        let text = text.trim();
        let target_language = target_language.trim();
        if text.is_empty() {
            return Err(TranslationError::InvalidInput("Text is required".to_string()));
        }
        if target_language.is_empty() {
            return Err(TranslationError::InvalidInput(
                "Target language is required".to_string(),
            ));
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(TranslationError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(text, target_language),
                },
            ],
            temperature: 0.0,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        tracing::debug!(chars = text.len(), target_language, "requesting translation");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslationError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %truncate(&body, 200), "translation API error");
            return Err(TranslationError::Upstream(format!(
                "translation API returned {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Upstream(format!("malformed API response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TranslationError::Upstream("API response has no choices".to_string()))?;

        parse_reply(&content)
            .ok_or_else(|| TranslationError::Upstream("API returned an empty reply".to_string()))
    }

    /// Extract the text of an uploaded document and translate it.
    /// The upload is only held in memory.
    pub async fn translate_file(
        &self,
        file: UploadedFile,
        target_language: &str,
    ) -> Result<TranslationReply, TranslationError> {
        let kind = DocumentKind::detect(file.content_type.as_deref(), &file.file_name)
            .ok_or(TranslationError::Extraction(ExtractError::Unsupported))?;

        let text = extractor::extract(kind, file.data).await.map_err(|e| {
            tracing::info!(file_name = %file.file_name, error = %e, "file extraction failed");
            TranslationError::Extraction(e)
        })?;

        self.translate(&text, target_language).await
    }
}

/// User prompt asking for a JSON reply. The text is embedded as a JSON string
/// so quotes and newlines cannot break out of it.
pub fn build_prompt(text: &str, target_language: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text));
    format!(
        "Translate the text below into {target_language}.\n\
         Reply with exactly one JSON object of the form \
         {{\"translated_text\": \"...\", \"original_language\": \"...\"}} \
         where original_language is the English name of the language the text is written in.\n\
         Keep it on one line and translate only what is written.\n\n\
         Text (JSON string): {quoted}"
    )
}

/// Interpret a model reply. Accepts a JSON object (possibly wrapped in
/// reasoning blocks or code fences), the older `text: ... -- original_language: ...`
/// line format, or plain text. Returns `None` for an empty reply.
pub fn parse_reply(content: &str) -> Option<TranslationReply> {
    let cleaned = strip_code_fences(&strip_think_blocks(content));
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Some(reply) = parse_json_reply(cleaned) {
        return Some(reply);
    }

    if let Some(reply) = parse_line_reply(cleaned) {
        return Some(reply);
    }

    Some(TranslationReply {
        translated_text: cleaned.to_string(),
        original_language: UNKNOWN_LANGUAGE.to_string(),
    })
}

fn parse_json_reply(content: &str) -> Option<TranslationReply> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    let reply: TranslationReply = serde_json::from_str(&content[start..=end]).ok()?;
    if reply.translated_text.trim().is_empty() {
        return None;
    }

    Some(TranslationReply {
        translated_text: reply.translated_text.trim().to_string(),
        original_language: clean_language(Some(&reply.original_language)),
    })
}

const LINE_TEXT_PREFIX: &str = "text:";
const LINE_LANGUAGE_MARKER: &str = "-- original_language:";

/// `text: <translation> -- original_language: <language>`; the reply must open
/// with the prefix, and the language marker is taken from the end.
fn parse_line_reply(content: &str) -> Option<TranslationReply> {
    let rest = content.strip_prefix(LINE_TEXT_PREFIX)?;
    let (text, language) = match rest.rfind(LINE_LANGUAGE_MARKER) {
        Some(idx) => (&rest[..idx], Some(&rest[idx + LINE_LANGUAGE_MARKER.len()..])),
        None => (rest, None),
    };

    let text = text.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    if text.is_empty() {
        return None;
    }

    Some(TranslationReply {
        translated_text: text.to_string(),
        original_language: clean_language(language),
    })
}

fn clean_language(language: Option<&str>) -> String {
    language
        .map(|l| l.trim().trim_matches(|c: char| "\"'{}()[]".contains(c)).trim())
        .filter(|l| !l.is_empty())
        .map_or_else(|| UNKNOWN_LANGUAGE.to_string(), str::to_string)
}

/// Drop `<think>...</think>` reasoning sections some models emit.
fn strip_think_blocks(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_code_fences(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
