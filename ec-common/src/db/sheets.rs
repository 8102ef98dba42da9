//! Sheet persistence
//!
//! Stores [`SheetRecord`]s keyed by an opaque UUID string. The domain core
//! never touches the database; services call these functions with a record
//! produced by a [`crate::sheet::SheetSession`] or received over HTTP.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::sheet::{SheetRecord, SheetSummary, StoredSheet};
use crate::{time, Error, Result};

type SheetRow = (
    String,
    String,
    i64,
    String,
    Option<String>,
    Option<f64>,
    String,
    String,
);

const SELECT_SHEET: &str = r#"
    SELECT id, title, bpm, eight_counts, song_uri, song_duration, created_at, updated_at
    FROM sheets
    WHERE id = ?
"#;

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp {:?}: {}", value, e)))
}

fn row_to_sheet(row: SheetRow) -> Result<StoredSheet> {
    let (id, title, bpm, eight_counts, song_uri, song_duration, created_at, updated_at) = row;

    let bpm = u32::try_from(bpm)
        .map_err(|_| Error::Internal(format!("Invalid stored BPM {} for sheet {}", bpm, id)))?;

    Ok(StoredSheet {
        record: SheetRecord {
            title,
            bpm,
            eight_counts: serde_json::from_str(&eight_counts)?,
            song_uri,
            song_duration,
        },
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        id,
    })
}

/// Store a new sheet and return it with its assigned id
pub async fn insert_sheet(pool: &SqlitePool, record: &SheetRecord) -> Result<StoredSheet> {
    record.validate()?;

    let id = Uuid::new_v4().to_string();
    let now = time::now();
    let eight_counts = serde_json::to_string(&record.eight_counts)?;

    sqlx::query(
        r#"
        INSERT INTO sheets (id, title, bpm, eight_counts, song_uri, song_duration, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&record.title)
    .bind(record.bpm as i64)
    .bind(&eight_counts)
    .bind(&record.song_uri)
    .bind(record.song_duration)
    .bind(format_timestamp(&now))
    .bind(format_timestamp(&now))
    .execute(pool)
    .await?;

    debug!(sheet_id = %id, title = %record.title, "Inserted sheet");

    Ok(StoredSheet {
        id,
        record: record.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Overwrite an existing sheet, keeping its creation time
pub async fn update_sheet(pool: &SqlitePool, id: &str, record: &SheetRecord) -> Result<StoredSheet> {
    record.validate()?;

    let now = time::now();
    let eight_counts = serde_json::to_string(&record.eight_counts)?;

    let result = sqlx::query(
        r#"
        UPDATE sheets
        SET title = ?, bpm = ?, eight_counts = ?, song_uri = ?, song_duration = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&record.title)
    .bind(record.bpm as i64)
    .bind(&eight_counts)
    .bind(&record.song_uri)
    .bind(record.song_duration)
    .bind(format_timestamp(&now))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("sheet {}", id)));
    }

    debug!(sheet_id = %id, title = %record.title, "Updated sheet");
    get_sheet(pool, id).await
}

/// Insert or update depending on whether the sheet already has an id
pub async fn save_sheet(
    pool: &SqlitePool,
    current_id: Option<&str>,
    record: &SheetRecord,
) -> Result<StoredSheet> {
    match current_id {
        Some(id) => update_sheet(pool, id, record).await,
        None => insert_sheet(pool, record).await,
    }
}

/// Load one sheet by id
pub async fn get_sheet(pool: &SqlitePool, id: &str) -> Result<StoredSheet> {
    let row = sqlx::query_as::<_, SheetRow>(SELECT_SHEET)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("sheet {}", id)))?;

    row_to_sheet(row)
}

/// All saved sheets, most recently updated first
pub async fn list_sheets(pool: &SqlitePool) -> Result<Vec<SheetSummary>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT id, title FROM sheets ORDER BY updated_at DESC, title ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, title)| SheetSummary { id, title })
        .collect())
}

/// Remove a sheet
pub async fn delete_sheet(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM sheets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("sheet {}", id)));
    }

    debug!(sheet_id = %id, "Deleted sheet");
    Ok(())
}
