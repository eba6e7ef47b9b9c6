//! Study assistant chat: session history and the language model relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gemini REST endpoint prefix.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// History messages forwarded with each prompt, besides the system prompt.
pub const HISTORY_WINDOW: usize = 10;

pub const SYSTEM_PROMPT: &str = "Sei SchoolBot, un assistente simpatico e paziente per studenti delle scuole superiori italiane. Aiuti con i compiti, spieghi concetti difficili in modo semplice e organizzi lo studio. Usa emoji. Non dare soluzioni complete ai compiti, ma guida lo studente verso la risposta. Sii incoraggiante.";

pub const GREETING: &str = "Ciao! 👋 Sono il tuo Tutor AI. Come posso aiutarti oggi con la scuola?";

pub const EMPTY_REPLY: &str = "Non ho capito, puoi ripetere?";

pub const FAILURE_REPLY: &str = "Mi dispiace, ho avuto un problema tecnico. Riprova più tardi.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("API key missing")]
    MissingApiKey,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("chat API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse chat response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(rename = "ai")]
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::System,
            text: text.into(),
        }
    }
}

/// Something that can turn a conversation into the assistant's next reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

/// A conversation with the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// A fresh session opened by the assistant greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    /// Resume a session from a client-held history.
    pub fn with_history(messages: Vec<ChatMessage>) -> Self {
        if messages.is_empty() {
            return Self::new();
        }
        Self { messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// System prompt, the last [`HISTORY_WINDOW`] messages, then `pending`.
    pub fn prompt_for(&self, pending: &ChatMessage) -> Vec<ChatMessage> {
        let skip = self.messages.len().saturating_sub(HISTORY_WINDOW);
        std::iter::once(ChatMessage::system(SYSTEM_PROMPT))
            .chain(self.messages[skip..].iter().cloned())
            .chain(std::iter::once(pending.clone()))
            .collect()
    }

    /// Send a user message and append the reply.
    ///
    /// Backend failures do not fail the call: the apology reply is appended
    /// instead so the conversation can continue.
    pub async fn send(
        &mut self,
        text: &str,
        backend: &dyn ChatBackend,
    ) -> Result<&ChatMessage, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let user_message = ChatMessage::user(text);
        let prompt = self.prompt_for(&user_message);
        self.messages.push(user_message);

        let reply = match backend.generate(&prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "chat backend failed");
                FAILURE_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(reply));
        Ok(&self.messages[self.messages.len() - 1])
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Anything not sent by the user is replayed under the `model` role.
    pub fn build_request(messages: &[ChatMessage]) -> GeminiRequest {
        let contents = messages
            .iter()
            .map(|message| GeminiContent {
                role: match message.sender {
                    Sender::User => "user".to_string(),
                    Sender::Assistant | Sender::System => "model".to_string(),
                },
                parts: vec![GeminiPart {
                    text: message.text.clone(),
                }],
            })
            .collect();
        GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1000,
            },
        }
    }

    pub fn reply_from_body(body: &str) -> Result<String, ChatError> {
        let response: GeminiResponse =
            serde_json::from_str(body).map_err(|err| ChatError::Parse(err.to_string()))?;
        Ok(response
            .text()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(EMPTY_REPLY)
            .to_string())
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self.api_key.as_ref().ok_or(ChatError::MissingApiKey)?;
        let request = Self::build_request(messages);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|err| ChatError::Request(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ChatError::Request(err.to_string()))?;

        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Self::reply_from_body(&body)
    }
}
