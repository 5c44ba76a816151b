use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{QueueStatus, RiskLevel};
use crate::models::{Patient, TriageEntry};

pub fn insert_triage(conn: &Connection, entry: &TriageEntry) -> Result<(), DatabaseError> {
    let transcript_json = serde_json::to_string(&entry.transcript)?;
    conn.execute(
        "INSERT INTO triages
         (id, patient_id, protocol, password, risk_level, summary,
          initial_symptoms, status, created_at, transcript)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.id.to_string(),
            entry.patient_id.to_string(),
            entry.protocol,
            entry.password,
            entry.risk_level.as_str(),
            entry.summary,
            entry.initial_symptoms,
            entry.status.as_str(),
            entry.created_at,
            transcript_json,
        ],
    )?;
    Ok(())
}

const TRIAGE_COLUMNS: &str =
    "id, patient_id, protocol, password, risk_level, summary, initial_symptoms, status, created_at, transcript";

fn triage_from_row(row: &Row<'_>) -> Result<TriageEntry, rusqlite::Error> {
    Ok(TriageEntry {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        patient_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        protocol: row.get(2)?,
        password: row.get(3)?,
        // Unknown stored levels degrade to indefinido, never to a hole
        risk_level: RiskLevel::parse_lenient(&row.get::<_, String>(4)?),
        summary: row.get(5)?,
        initial_symptoms: row.get(6)?,
        status: row.get::<_, String>(7)?.parse().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                "unknown queue status".into(),
            )
        })?,
        created_at: row.get::<_, DateTime<Utc>>(8)?,
        transcript: serde_json::from_str(&row.get::<_, String>(9)?).unwrap_or_default(),
    })
}

/// Exact-equality lookup by public protocol token.
pub fn get_triage_by_protocol(
    conn: &Connection,
    protocol: &str,
) -> Result<Option<TriageEntry>, DatabaseError> {
    let sql = format!("SELECT {TRIAGE_COLUMNS} FROM triages WHERE protocol = ?1");
    let result = conn.query_row(&sql, params![protocol], triage_from_row);

    match result {
        Ok(entry) => Ok(Some(entry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All entries still waiting, joined with their patients, in insertion order.
/// Ordering for display is derived downstream; the store never re-sorts.
pub fn list_waiting_with_patients(
    conn: &Connection,
) -> Result<Vec<(TriageEntry, Patient)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.patient_id, t.protocol, t.password, t.risk_level, t.summary,
                t.initial_symptoms, t.status, t.created_at, t.transcript,
                p.id, p.full_name, p.age, p.phone, p.is_priority
         FROM triages t
         JOIN patients p ON p.id = t.patient_id
         WHERE t.status = 'aguardando'
         ORDER BY t.rowid",
    )?;

    let rows = stmt.query_map([], |row| {
        let entry = triage_from_row(row)?;
        let patient = Patient {
            id: Uuid::parse_str(&row.get::<_, String>(10)?).unwrap_or_default(),
            full_name: row.get(11)?,
            age: row.get(12)?,
            phone: row.get(13)?,
            is_priority: row.get(14)?,
        };
        Ok((entry, patient))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// Advance a queue entry's status by exactly one forward step.
///
/// The attendant dashboard is the only writer of this field; illegal
/// transitions (reverse, skip, repeat) are rejected.
pub fn advance_triage_status(
    conn: &Connection,
    id: &Uuid,
    next: QueueStatus,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let current: QueueStatus = tx
        .query_row(
            "SELECT status FROM triages WHERE id = ?1",
            params![id.to_string()],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
                entity_type: "TriageEntry".into(),
                id: id.to_string(),
            },
            other => DatabaseError::Sqlite(other),
        })?
        .parse()?;

    if !current.can_advance_to(next) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "cannot move triage {id} from {} to {}",
            current.as_str(),
            next.as_str(),
        )));
    }

    tx.execute(
        "UPDATE triages SET status = ?1 WHERE id = ?2",
        params![next.as_str(), id.to_string()],
    )?;
    tx.commit()?;

    tracing::info!(triage = %id, status = next.as_str(), "queue entry advanced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::SpeakerRole;
    use crate::models::ChatTurn;

    fn seed_patient(conn: &Connection, is_priority: bool) -> Patient {
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: "João Pereira".into(),
            age: if is_priority { 72 } else { 30 },
            phone: "11988887777".into(),
            is_priority,
        };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn sample_entry(patient_id: Uuid, protocol: &str) -> TriageEntry {
        TriageEntry {
            id: Uuid::new_v4(),
            patient_id,
            protocol: protocol.into(),
            password: "G001".into(),
            risk_level: RiskLevel::Amarelo,
            summary: "Vômito persistente há dois dias".into(),
            initial_symptoms: "enjoo e vômito".into(),
            status: QueueStatus::Aguardando,
            created_at: Utc::now(),
            transcript: vec![
                ChatTurn::new(0, SpeakerRole::Assistant, "Há quanto tempo sente enjoo?"),
                ChatTurn::new(1, SpeakerRole::Patient, "Dois dias"),
            ],
        }
    }

    #[test]
    fn insert_and_find_by_protocol() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, false);
        let entry = sample_entry(patient.id, "PRT-1700000000000");
        insert_triage(&conn, &entry).unwrap();

        let loaded = get_triage_by_protocol(&conn, "PRT-1700000000000")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, entry.id);
        assert_eq!(loaded.password, "G001");
        assert_eq!(loaded.risk_level, RiskLevel::Amarelo);
        assert_eq!(loaded.status, QueueStatus::Aguardando);
        assert_eq!(loaded.transcript, entry.transcript);
    }

    #[test]
    fn unknown_protocol_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_triage_by_protocol(&conn, "PRT-123").unwrap().is_none());
    }

    #[test]
    fn protocol_is_unique() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, false);
        insert_triage(&conn, &sample_entry(patient.id, "PRT-42")).unwrap();

        let duplicate = insert_triage(&conn, &sample_entry(patient.id, "PRT-42"));
        assert!(duplicate.is_err());
    }

    #[test]
    fn waiting_list_excludes_other_statuses() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, false);

        let waiting = sample_entry(patient.id, "PRT-1");
        insert_triage(&conn, &waiting).unwrap();

        let done = sample_entry(patient.id, "PRT-2");
        insert_triage(&conn, &done).unwrap();
        advance_triage_status(&conn, &done.id, QueueStatus::EmAtendimento).unwrap();

        let rows = list_waiting_with_patients(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.id, waiting.id);
        assert_eq!(rows[0].1.id, patient.id);
    }

    #[test]
    fn status_advances_one_step_at_a_time() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, false);
        let entry = sample_entry(patient.id, "PRT-3");
        insert_triage(&conn, &entry).unwrap();

        advance_triage_status(&conn, &entry.id, QueueStatus::EmAtendimento).unwrap();
        advance_triage_status(&conn, &entry.id, QueueStatus::Finalizado).unwrap();

        let loaded = get_triage_by_protocol(&conn, "PRT-3").unwrap().unwrap();
        assert_eq!(loaded.status, QueueStatus::Finalizado);
    }

    #[test]
    fn status_skip_and_reverse_are_rejected() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, false);
        let entry = sample_entry(patient.id, "PRT-4");
        insert_triage(&conn, &entry).unwrap();

        let skip = advance_triage_status(&conn, &entry.id, QueueStatus::Finalizado);
        assert!(matches!(skip, Err(DatabaseError::ConstraintViolation(_))));

        advance_triage_status(&conn, &entry.id, QueueStatus::EmAtendimento).unwrap();
        let reverse = advance_triage_status(&conn, &entry.id, QueueStatus::Aguardando);
        assert!(matches!(reverse, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn advancing_missing_entry_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = advance_triage_status(&conn, &Uuid::new_v4(), QueueStatus::EmAtendimento);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn unknown_risk_level_reads_as_indefinido() {
        let conn = open_memory_database().unwrap();
        let patient = seed_patient(&conn, false);
        let mut entry = sample_entry(patient.id, "PRT-5");
        entry.transcript.clear();
        insert_triage(&conn, &entry).unwrap();

        conn.execute(
            "UPDATE triages SET risk_level = 'roxo' WHERE id = ?1",
            params![entry.id.to_string()],
        )
        .unwrap();

        let loaded = get_triage_by_protocol(&conn, "PRT-5").unwrap().unwrap();
        assert_eq!(loaded.risk_level, RiskLevel::Indefinido);
    }
}
