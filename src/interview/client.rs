//! HTTP client for the external risk-classification service.
//!
//! The service is text-in/text-out: the caller supplies a system
//! instruction and the conversation so far, and receives one reply.
//! Context is preserved client-side by replaying the wire history on
//! every call, so the remote end always sees prior turns.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::models::enums::SpeakerRole;
use crate::models::ChatTurn;

/// Default interview model; the kiosk overrides via `TRIAGEM_MODEL`.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Interview turns are short; a hung call must fail into degraded mode
/// rather than freeze the kiosk.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("could not connect to triage service at {0}")]
    Connection(String),

    #[error("triage service request timed out after {0}s")]
    Timeout(u64),

    #[error("triage service quota exhausted (status {status})")]
    QuotaExceeded { status: u16, body: String },

    #[error("triage service returned status {status}")]
    Http { status: u16, body: String },

    #[error("unreadable triage service reply: {0}")]
    ResponseParsing(String),
}

impl ChatServiceError {
    /// Rate-limit/quota failures get their own degraded message downstream.
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// One conversational exchange with the external classification service.
pub trait ChatService {
    /// Send the conversation so far and receive the next assistant reply.
    fn converse(
        &self,
        system_instruction: &str,
        turns: &[ChatTurn],
    ) -> Result<String, ChatServiceError>;
}

/// Blocking HTTP client for a Gemini-style `generateContent` endpoint.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Build a client from the environment: `GEMINI_API_KEY` (required by
    /// the real service), optional `TRIAGEM_GEMINI_URL` and `TRIAGEM_MODEL`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TRIAGEM_GEMINI_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let model = std::env::var("TRIAGEM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(&base_url, &api_key, &model, DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify_failure(&self, status: u16, body: String) -> ChatServiceError {
        let lowered = body.to_lowercase();
        if status == 429 || lowered.contains("resource_exhausted") || lowered.contains("quota") {
            ChatServiceError::QuotaExceeded { status, body }
        } else {
            ChatServiceError::Http { status, body }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: InstructionBody<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct InstructionBody<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl ChatService for GeminiClient {
    fn converse(
        &self,
        system_instruction: &str,
        turns: &[ChatTurn],
    ) -> Result<String, ChatServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        );

        let body = GenerateRequest {
            system_instruction: InstructionBody {
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: match turn.role {
                        SpeakerRole::Patient => "user",
                        SpeakerRole::Assistant => "model",
                    },
                    parts: vec![Part { text: &turn.text }],
                })
                .collect(),
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ChatServiceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ChatServiceError::Timeout(self.timeout_secs)
            } else {
                ChatServiceError::ResponseParsing(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(self.classify_failure(status.as_u16(), body));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ChatServiceError::ResponseParsing(e.to_string()))?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ChatServiceError::ResponseParsing(
                "reply envelope carried no text".into(),
            ));
        }

        Ok(text)
    }
}

/// Scripted chat service for tests — replies (or fails) in order and
/// records how many wire turns each call carried.
pub struct MockChatService {
    script: RefCell<VecDeque<Result<String, ChatServiceError>>>,
    wire_lengths: RefCell<Vec<usize>>,
}

impl MockChatService {
    pub fn new() -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            wire_lengths: RefCell::new(Vec::new()),
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.script.borrow_mut().push_back(Ok(text.to_string()));
        self
    }

    pub fn failure(self, err: ChatServiceError) -> Self {
        self.script.borrow_mut().push_back(Err(err));
        self
    }

    /// Number of wire turns seen by each call, in call order.
    pub fn wire_lengths(&self) -> Vec<usize> {
        self.wire_lengths.borrow().clone()
    }
}

impl Default for MockChatService {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatService for MockChatService {
    fn converse(
        &self,
        _system_instruction: &str,
        turns: &[ChatTurn],
    ) -> Result<String, ChatServiceError> {
        self.wire_lengths.borrow_mut().push(turns.len());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatServiceError::ResponseParsing("mock script exhausted".into())))
    }
}
