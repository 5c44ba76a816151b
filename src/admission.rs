//! Registration validation and queue admission.
//!
//! `admit` is the single point where a patient leaves registration and
//! enters the waiting queue: it allocates the call code from the shared
//! counter, mints a protocol token, and persists Patient + TriageEntry in
//! one transaction. An abandoned interview never reaches this module, so
//! no partial record can exist.

use chrono::Utc;
use rand::Rng;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{MIN_PHONE_DIGITS, PRIORITY_AGE};
use crate::db::repository::{
    insert_patient, insert_triage, next_counter_value, PASSWORD_COUNTER,
};
use crate::db::DatabaseError;
use crate::models::enums::QueueStatus;
use crate::models::{ChatTurn, Patient, RiskVerdict, TriageEntry};

#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("full name is required")]
    EmptyName,

    #[error("phone must have at least {MIN_PHONE_DIGITS} digits, got {0}")]
    PhoneTooShort(usize),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Validate registration fields and build a Patient.
///
/// The phone is normalized to digits before validation, as typed or
/// dictated numbers arrive with punctuation. Nothing is persisted here;
/// a validation failure leaves no partial record anywhere.
pub fn register_patient(
    full_name: &str,
    age: u32,
    phone: &str,
) -> Result<Patient, AdmissionError> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(AdmissionError::EmptyName);
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(AdmissionError::PhoneTooShort(digits.len()));
    }

    Ok(Patient {
        id: Uuid::new_v4(),
        full_name: full_name.to_string(),
        age,
        phone: digits,
        is_priority: age >= PRIORITY_AGE,
    })
}

/// Mint a public tracking token: `PRT-` + admission millis + entropy
/// suffix. Uniqueness is the only contract; the UNIQUE column backs it.
fn new_protocol_token() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("PRT-{millis}{suffix:03}")
}

/// Admit a patient with a concluded interview into the waiting queue.
///
/// Patient and entry become visible together or not at all. The call-code
/// sequence is shared across both prefixes and incremented atomically, so
/// concurrent admissions never collide.
pub fn admit(
    conn: &Connection,
    patient: &Patient,
    initial_symptoms: &str,
    verdict: &RiskVerdict,
    transcript: &[ChatTurn],
) -> Result<TriageEntry, AdmissionError> {
    let tx = conn.unchecked_transaction().map_err(DatabaseError::Sqlite)?;

    let seq = next_counter_value(&tx, PASSWORD_COUNTER)?;
    let prefix = if patient.is_priority { 'P' } else { 'G' };
    let password = format!("{prefix}{seq:03}");

    let entry = TriageEntry {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        protocol: new_protocol_token(),
        password,
        risk_level: verdict.risk_level,
        summary: verdict.summary.clone(),
        initial_symptoms: initial_symptoms.to_string(),
        status: QueueStatus::Aguardando,
        created_at: Utc::now(),
        transcript: transcript.to_vec(),
    };

    insert_patient(&tx, patient)?;
    insert_triage(&tx, &entry)?;
    tx.commit().map_err(DatabaseError::Sqlite)?;

    tracing::info!(
        protocol = %entry.protocol,
        password = %entry.password,
        risk = entry.risk_level.as_str(),
        "patient admitted to queue",
    );
    Ok(entry)
}
