//! The conversational triage interview: external service client, system
//! prompt, verdict extraction, and the turn-based session driver.

pub mod client;
pub mod prompt;
pub mod session;
pub mod verdict;

use thiserror::Error;

pub use client::{ChatService, ChatServiceError, GeminiClient, MockChatService};
pub use session::{InterviewStep, TriageInterview};
pub use verdict::{parse_reply, ParsedReply};

/// Misuse of a session that already reached a terminal state. Service
/// failures never surface here; the driver absorbs them into degraded steps.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InterviewError {
    #[error("interview already concluded with a verdict")]
    AlreadyConcluded,

    #[error("interview was abandoned after a service failure")]
    Abandoned,
}
