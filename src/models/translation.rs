// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// API Types
// ============================================================================

/// Request to translate pasted text.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TextTranslationRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "targetLanguage")]
    pub target_language: String,
}

/// Result of a text or file translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslationResponse {
    pub translated_text: Option<String>,
    pub original_language: Option<String>,
    pub target_language: String,
    pub success: bool,
    pub error_message: Option<String>,
}

impl TranslationResponse {
    pub fn success(reply: TranslationReply, target_language: &str) -> Self {
        Self {
            translated_text: Some(reply.translated_text),
            original_language: Some(reply.original_language),
            target_language: target_language.to_string(),
            success: true,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>, target_language: &str) -> Self {
        Self {
            translated_text: None,
            original_language: None,
            target_language: target_language.to_string(),
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// Language reported when the model does not name one.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Translation parsed out of the model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReply {
    pub translated_text: String,
    #[serde(default)]
    pub original_language: String,
}

// ============================================================================
// Chat Completions Wire Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
