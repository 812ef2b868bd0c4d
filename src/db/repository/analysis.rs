use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AnalysisRecord, ImageCategory};

pub fn insert_analysis(conn: &Connection, record: &AnalysisRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO analyses (id, owner_id, image_ref, image_category, raw_text, custom_label, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id.to_string(),
            record.owner_id.to_string(),
            record.image_ref,
            record.image_category.as_str(),
            record.raw_text,
            record.custom_label,
            record.created_at.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_analysis(conn: &Connection, id: &Uuid) -> Result<Option<AnalysisRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, image_ref, image_category, raw_text, custom_label, created_at
         FROM analyses WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(AnalysisRow {
            id: row.get::<_, String>(0)?,
            owner_id: row.get::<_, String>(1)?,
            image_ref: row.get::<_, String>(2)?,
            image_category: row.get::<_, String>(3)?,
            raw_text: row.get::<_, String>(4)?,
            custom_label: row.get::<_, Option<String>>(5)?,
            created_at: row.get::<_, String>(6)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(analysis_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All analyses run by one clinician, most recent first.
pub fn list_analyses_for_owner(
    conn: &Connection,
    owner_id: &Uuid,
) -> Result<Vec<AnalysisRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, image_ref, image_category, raw_text, custom_label, created_at
         FROM analyses WHERE owner_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![owner_id.to_string()], |row| {
        Ok(AnalysisRow {
            id: row.get::<_, String>(0)?,
            owner_id: row.get::<_, String>(1)?,
            image_ref: row.get::<_, String>(2)?,
            image_category: row.get::<_, String>(3)?,
            raw_text: row.get::<_, String>(4)?,
            custom_label: row.get::<_, Option<String>>(5)?,
            created_at: row.get::<_, String>(6)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(analysis_from_row(row?)?);
    }
    Ok(records)
}

/// Rename an analysis. `custom_label` is the only mutable field; the update
/// is owner-scoped, so a non-owner sees the record as not found.
pub fn rename_analysis(
    conn: &Connection,
    id: &Uuid,
    owner_id: &Uuid,
    custom_label: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE analyses SET custom_label = ?3 WHERE id = ?1 AND owner_id = ?2",
        params![id.to_string(), owner_id.to_string(), custom_label],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "analysis".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete an analysis. Owner-scoped like `rename_analysis`.
pub fn delete_analysis(
    conn: &Connection,
    id: &Uuid,
    owner_id: &Uuid,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM analyses WHERE id = ?1 AND owner_id = ?2",
        params![id.to_string(), owner_id.to_string()],
    )?;

    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "analysis".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct AnalysisRow {
    id: String,
    owner_id: String,
    image_ref: String,
    image_category: String,
    raw_text: String,
    custom_label: Option<String>,
    created_at: String,
}

fn analysis_from_row(row: AnalysisRow) -> Result<AnalysisRecord, DatabaseError> {
    Ok(AnalysisRecord {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        owner_id: Uuid::parse_str(&row.owner_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        image_ref: row.image_ref,
        image_category: ImageCategory::from_str(&row.image_category)?,
        raw_text: row.raw_text,
        custom_label: row.custom_label,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%dT%H:%M:%S"))
            .unwrap_or_default(),
    })
}
