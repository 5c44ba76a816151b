//! The staff-facing waiting line, derived on every read.
//!
//! Ordering is a pure function of the current entry set: priority tier,
//! then severity, then arrival time. Nothing here mutates entries.

use rusqlite::Connection;

use crate::db::repository::list_waiting_with_patients;
use crate::db::DatabaseError;
use crate::models::{Patient, TriageEntry};

/// One waiting-line row: the queue entry joined with its patient.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub triage: TriageEntry,
    pub patient: Patient,
}

/// Sort rows into calling order.
///
/// 1. Priority admissions before all others, regardless of risk level.
/// 2. Within a tier, most severe risk first (canonical severity rank).
/// 3. Within tier and level, first come, first served.
///
/// The sort is stable, so rows equal under all three rules keep their
/// store order.
pub fn order_queue(rows: &mut [QueueEntry]) {
    rows.sort_by(|a, b| {
        b.patient
            .is_priority
            .cmp(&a.patient.is_priority)
            .then_with(|| {
                a.triage
                    .risk_level
                    .severity_rank()
                    .cmp(&b.triage.risk_level.severity_rank())
            })
            .then_with(|| a.triage.created_at.cmp(&b.triage.created_at))
    });
}

/// Case-insensitive substring match on patient name or protocol token.
pub fn matches_search(row: &QueueEntry, term: &str) -> bool {
    let term = term.to_lowercase();
    row.patient.full_name.to_lowercase().contains(&term)
        || row.triage.protocol.to_lowercase().contains(&term)
}

/// The live waiting line: all `aguardando` entries, optionally filtered,
/// in calling order. Recomputed from the store on every call.
pub fn waiting_queue(
    conn: &Connection,
    search: Option<&str>,
) -> Result<Vec<QueueEntry>, DatabaseError> {
    let mut rows: Vec<QueueEntry> = list_waiting_with_patients(conn)?
        .into_iter()
        .map(|(triage, patient)| QueueEntry { triage, patient })
        .collect();

    if let Some(term) = search {
        if !term.trim().is_empty() {
            rows.retain(|row| matches_search(row, term.trim()));
        }
    }

    order_queue(&mut rows);
    Ok(rows)
}
