use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{QueueStatus, RiskLevel, SpeakerRole};

/// One utterance in a triage interview. The ordered sequence of turns is
/// the transcript; turns are append-only and never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub seq: u32,
    pub role: SpeakerRole,
    pub text: String,
}

impl ChatTurn {
    pub fn new(seq: u32, role: SpeakerRole, text: impl Into<String>) -> Self {
        Self {
            seq,
            role,
            text: text.into(),
        }
    }
}

/// The structured judgment that ends an interview: a technical summary for
/// clinical staff plus the classified risk level. Produced exactly once per
/// completed interview; immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub summary: String,
    pub risk_level: RiskLevel,
}

/// A durable waiting-queue record. Created once at admission, mutated only
/// by forward status transitions, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Public tracking token, globally unique, immutable once assigned.
    pub protocol: String,
    /// Human-readable call code: `P`/`G` prefix + shared 3-digit sequence.
    pub password: String,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub initial_symptoms: String,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<ChatTurn>,
}
