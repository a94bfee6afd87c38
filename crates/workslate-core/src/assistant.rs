//! AI tutor chat and text translation collaborators.
//!
//! The core defines the message model, prompts and wire payloads; the
//! transport lives behind the [`Assistant`] trait.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reply shown in the chat when the assistant cannot be reached.
pub const CHAT_FALLBACK_REPLY: &str =
    "I'm having trouble connecting to the brain. Please try again in a moment!";

/// Placeholder text shown while a translation is in flight.
pub const TRANSLATING_PLACEHOLDER: &str = "Translating...";

/// Placeholder text shown while the assistant is answering.
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Parse(String),
    #[error("Empty response")]
    Empty,
}

/// Audience level the tutor pitches its explanations at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssistantLevel {
    #[default]
    #[serde(rename = "KS1")]
    Ks1,
    #[serde(rename = "KS2")]
    Ks2,
    #[serde(rename = "KS3")]
    Ks3,
    #[serde(rename = "KS4")]
    Ks4,
    #[serde(rename = "KS5")]
    Ks5,
}

impl AssistantLevel {
    pub const ALL: [AssistantLevel; 5] = [Self::Ks1, Self::Ks2, Self::Ks3, Self::Ks4, Self::Ks5];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ks1 => "KS1",
            Self::Ks2 => "KS2",
            Self::Ks3 => "KS3",
            Self::Ks4 => "KS4",
            Self::Ks5 => "KS5",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Ks1 => {
                "Explain simply for a 5-7 year old child. Use short sentences, fun analogies, and very basic vocabulary."
            }
            Self::Ks2 => {
                "Explain for a 7-11 year old student. Use clear language, helpful examples, and avoid overly complex jargon."
            }
            Self::Ks3 => {
                "Explain for a 11-14 year old student. You can use subject-specific terminology but explain it clearly."
            }
            Self::Ks4 => {
                "Explain for a 14-16 year old student (GCSE level). Use formal academic language and precise terminology suitable for exams."
            }
            Self::Ks5 => {
                "Explain for a 16-18 year old student (A-Level/College). Use advanced academic language, deep technical detail, and assume strong prior knowledge."
            }
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for AssistantLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// System prompt for the tutor at a given level.
pub fn build_system_prompt(level: AssistantLevel) -> String {
    format!(
        "You are a helpful AI Tutor embedded in a whiteboard app.\n\
         - **Target Audience:** {} ({})\n\
         - Keep answers concise, clear, and friendly.\n\
         - **MATH FORMATTING RULES:** - Use LaTeX for all mathematical expressions.\n  \
         - **IMPORTANT: DO NOT use dollar signs ($) anywhere.**\n  \
         - Instead, strictly use the bracket syntax:\n  \
         - Use \\( and \\) for inline math. Example: \\( x^2 + y^2 = r^2 \\)\n  \
         - Use \\[ and \\] for block equations. Example: \\[ E = mc^2 \\]\n",
        level.label(),
        level.instruction()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Body of a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub seed: u64,
}

impl ChatRequest {
    pub const DEFAULT_MODEL: &'static str = "openai";
    pub const DEFAULT_SEED: u64 = 42;

    /// A single-turn request: the system prompt for `level` plus `text`.
    pub fn new(level: AssistantLevel, text: &str) -> Self {
        Self {
            messages: vec![ChatMessage::system(build_system_prompt(level)), ChatMessage::user(text)],
            model: Self::DEFAULT_MODEL.to_string(),
            seed: Self::DEFAULT_SEED,
        }
    }
}

/// Translation target languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    French,
    Spanish,
    German,
    Italian,
    Mandarin,
    Arabic,
    Japanese,
    Hindi,
    Turkish,
    Korean,
    Portuguese,
    Russian,
    Dutch,
    Polish,
    Vietnamese,
    Thai,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Self::French,
        Self::Spanish,
        Self::German,
        Self::Italian,
        Self::Mandarin,
        Self::Arabic,
        Self::Japanese,
        Self::Hindi,
        Self::Turkish,
        Self::Korean,
        Self::Portuguese,
        Self::Russian,
        Self::Dutch,
        Self::Polish,
        Self::Vietnamese,
        Self::Thai,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::French => "French",
            Self::Spanish => "Spanish",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Mandarin => "Chinese (Mandarin)",
            Self::Arabic => "Arabic",
            Self::Japanese => "Japanese",
            Self::Hindi => "Hindi",
            Self::Turkish => "Turkish",
            Self::Korean => "Korean",
            Self::Portuguese => "Portuguese",
            Self::Russian => "Russian",
            Self::Dutch => "Dutch",
            Self::Polish => "Polish",
            Self::Vietnamese => "Vietnamese",
            Self::Thai => "Thai",
        }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::French => "fr",
            Self::Spanish => "es",
            Self::German => "de",
            Self::Italian => "it",
            Self::Mandarin => "zh",
            Self::Arabic => "ar",
            Self::Japanese => "ja",
            Self::Hindi => "hi",
            Self::Turkish => "tr",
            Self::Korean => "ko",
            Self::Portuguese => "pt",
            Self::Russian => "ru",
            Self::Dutch => "nl",
            Self::Polish => "pl",
            Self::Vietnamese => "vi",
            Self::Thai => "th",
        }
    }

    /// Look up a language by display name, falling back to French.
    pub fn from_name(name: &str) -> Self {
        Self::ALL.into_iter().find(|l| l.name() == name).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationResponse {
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: Option<String>,
    #[serde(default)]
    response_data: Option<TranslationData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationData {
    translated_text: String,
}

/// Extract the translated text from a translation service response.
pub fn parse_translation_response(body: &str) -> Result<String, AssistantError> {
    let response: TranslationResponse =
        serde_json::from_str(body).map_err(|e| AssistantError::Parse(e.to_string()))?;
    // The service reports the status as either a number or a string.
    let status = match &response.response_status {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    };
    if status != Some(200) {
        return Err(AssistantError::Status {
            status: status.and_then(|s| u16::try_from(s).ok()).unwrap_or(0),
            message: response
                .response_details
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Translation failed".to_string()),
        });
    }
    let text = response.response_data.map(|d| d.translated_text).unwrap_or_default();
    if text.is_empty() {
        return Err(AssistantError::Empty);
    }
    Ok(text)
}

/// A remote assistant. Calls block; callers run them off the event loop.
pub trait Assistant: Send + Sync {
    fn chat(&self, request: &ChatRequest) -> Result<String, AssistantError>;

    fn translate(&self, text: &str, target: Language) -> Result<String, AssistantError>;
}

/// Conversation log shown in the chat panel.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub level: AssistantLevel,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(level: AssistantLevel) -> Self {
        Self { level, messages: Vec::new() }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Record a user message and build the request for it. Blank input
    /// yields `None`.
    pub fn ask(&mut self, text: &str) -> Option<ChatRequest> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        Some(ChatRequest::new(self.level, text))
    }

    /// Record the outcome of a request, substituting the fallback reply on
    /// failure. Returns the text appended to the log.
    pub fn reply_or_fallback(&mut self, result: Result<String, AssistantError>) -> &str {
        let content = match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                log::error!("AI error: {}", AssistantError::Empty);
                CHAT_FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                log::error!("AI error: {e}");
                CHAT_FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(content));
        self.messages.last().map(|m| m.content.as_str()).unwrap_or_default()
    }
}
