//! Public status lookup by protocol token.
//!
//! Unauthenticated and read-only: a patient scans their code or types the
//! token, and sees their own entry. Any non-match is `None`; the
//! presentation layer renders the "protocol not found" message.

use rusqlite::Connection;

use crate::db::repository::{get_patient, get_triage_by_protocol};
use crate::db::DatabaseError;
use crate::models::{Patient, TriageEntry};

/// Resolve a protocol token to its entry and patient by exact equality.
pub fn lookup_protocol(
    conn: &Connection,
    token: &str,
) -> Result<Option<(TriageEntry, Patient)>, DatabaseError> {
    let Some(entry) = get_triage_by_protocol(conn, token)? else {
        return Ok(None);
    };

    let patient = get_patient(conn, &entry.patient_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Patient".into(),
        id: entry.patient_id.to_string(),
    })?;

    Ok(Some((entry, patient)))
}
