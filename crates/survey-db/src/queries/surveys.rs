//! Survey queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::{params, ErrorCode, OptionalExtension, Row};

const COLUMNS: &str = "id, refid, name, secname, data, created_at, updated_at";

/// Survey row from database.
#[derive(Debug, Clone)]
pub struct SurveyRow {
    pub id: String,
    pub refid: String,
    pub name: String,
    pub secname: Option<String>,
    pub data: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SurveyRow {
    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            refid: row.get(1)?,
            name: row.get(2)?,
            secname: row.get(3)?,
            data: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

/// Columns to change on update. `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct SurveyChanges<'a> {
    pub name: Option<&'a str>,
    pub secname: Option<&'a str>,
    pub data: Option<&'a str>,
}

/// Insert a new survey. A duplicate refid is reported as [`DbError::Conflict`].
pub fn create_survey(pool: &DbPool, row: &SurveyRow) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO surveys (id, refid, name, secname, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.id,
                row.refid,
                row.name,
                row.secname,
                row.data,
                row.created_at,
                row.updated_at
            ],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => {
                DbError::Conflict(format!("Survey refid already exists: {}", row.refid))
            }
            _ => DbError::Connection(e),
        })?;
        Ok(())
    })
}

/// List all surveys, newest first.
pub fn list_surveys(pool: &DbPool) -> DbResult<Vec<SurveyRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM surveys ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
            .query_map([], SurveyRow::from_sql)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Get a survey by refid.
pub fn get_survey_by_refid(pool: &DbPool, refid: &str) -> DbResult<Option<SurveyRow>> {
    pool.with_conn(|conn| {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM surveys WHERE refid = ?1"),
                params![refid],
                SurveyRow::from_sql,
            )
            .optional()?;
        Ok(row)
    })
}

/// Get a survey by ID.
pub fn get_survey(pool: &DbPool, id: &str) -> DbResult<SurveyRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM surveys WHERE id = ?1"),
            params![id],
            SurveyRow::from_sql,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Survey: {}", id)),
            e => DbError::Connection(e),
        })
    })
}

/// Apply `changes` to a survey and bump its `updated_at`.
pub fn update_survey(
    pool: &DbPool,
    id: &str,
    changes: &SurveyChanges<'_>,
    updated_at: &str,
) -> DbResult<()> {
    let affected = pool.with_conn(|conn| {
        Ok(conn.execute(
            "UPDATE surveys
             SET name = COALESCE(?2, name),
                 secname = COALESCE(?3, secname),
                 data = COALESCE(?4, data),
                 updated_at = ?5
             WHERE id = ?1",
            params![id, changes.name, changes.secname, changes.data, updated_at],
        )?)
    })?;

    if affected == 0 {
        return Err(DbError::NotFound(format!("Survey: {}", id)));
    }
    Ok(())
}

/// Delete a survey by ID.
pub fn delete_survey(pool: &DbPool, id: &str) -> DbResult<()> {
    let affected = pool.with_conn(|conn| {
        Ok(conn.execute("DELETE FROM surveys WHERE id = ?1", params![id])?)
    })?;

    if affected == 0 {
        return Err(DbError::NotFound(format!("Survey: {}", id)));
    }
    Ok(())
}
