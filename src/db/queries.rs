// Database queries: CRUD operations for the predictions table.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::models::PredictionRecord;
use crate::model::Label;

/// Store one prediction and return its row id.
pub fn insert_prediction(conn: &Connection, record: &PredictionRecord) -> Result<i64> {
    let top_tokens_json = record
        .top_tokens
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("Failed to encode top tokens")?;

    conn.execute(
        "INSERT INTO predictions
            (prediction_id, title, content, label, probability, model_version, top_tokens, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.prediction_id,
            record.title,
            record.content,
            record.label.as_str(),
            record.probability,
            record.model_version,
            top_tokens_json,
            record.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent predictions first. Rows with the same timestamp come back in
/// reverse insertion order.
pub fn fetch_history(conn: &Connection, limit: u32) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT prediction_id, title, content, label, probability, model_version,
                top_tokens, created_at
         FROM predictions
         ORDER BY created_at DESC, id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], record_from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Total number of stored predictions.
pub fn prediction_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
    Ok(count)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
    let label: String = row.get(3)?;
    let label = label
        .parse::<Label>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

    // A corrupt token list only loses the attribution, not the row.
    let top_tokens_json: Option<String> = row.get(6)?;
    let top_tokens = top_tokens_json.and_then(|json| serde_json::from_str(&json).ok());

    Ok(PredictionRecord {
        prediction_id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        label,
        probability: row.get(4)?,
        model_version: row.get(5)?,
        top_tokens,
        created_at: row.get(7)?,
    })
}
