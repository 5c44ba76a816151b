use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Patient;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, full_name, age, phone, is_priority)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient.id.to_string(),
            patient.full_name,
            patient.age,
            patient.phone,
            patient.is_priority,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, full_name, age, phone, is_priority FROM patients WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(Patient {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                full_name: row.get(1)?,
                age: row.get(2)?,
                phone: row.get(3)?,
                is_priority: row.get(4)?,
            })
        },
    );

    match result {
        Ok(patient) => Ok(Some(patient)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
