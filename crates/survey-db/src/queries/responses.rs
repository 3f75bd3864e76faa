//! Response queries.

use crate::pool::{DbPool, DbResult};
use rusqlite::{params, Connection, Row};

/// Response row from database.
#[derive(Debug, Clone)]
pub struct ResponseRow {
    pub id: String,
    pub refid: String,
    pub name: Option<String>,
    pub secname: Option<String>,
    pub data: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ResponseRow {
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

const INSERT: &str = "INSERT INTO responses (id, refid, name, secname, data, created_at, updated_at)
                      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

fn insert(conn: &Connection, row: &ResponseRow) -> rusqlite::Result<()> {
    conn.prepare_cached(INSERT)?.execute(params![
        row.id,
        row.refid,
        row.name,
        row.secname,
        row.data,
        row.created_at,
        row.updated_at
    ])?;
    Ok(())
}

/// Insert one response.
pub fn create_response(pool: &DbPool, row: &ResponseRow) -> DbResult<()> {
    pool.with_conn(|conn| {
        insert(conn, row)?;
        Ok(())
    })
}

/// Insert every row in a single transaction; nothing is stored if any insert fails.
pub fn create_responses(pool: &DbPool, rows: &[ResponseRow]) -> DbResult<()> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        for row in rows {
            insert(&tx, row)?;
        }
        tx.commit()?;
        Ok(())
    })
}

/// List responses for a survey refid, newest first.
pub fn list_responses_by_refid(pool: &DbPool, refid: &str) -> DbResult<Vec<ResponseRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, refid, name, secname, data, created_at, updated_at
             FROM responses WHERE refid = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map(params![refid], ResponseRow::from_sql)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Count responses for a survey refid.
pub fn count_responses_by_refid(pool: &DbPool, refid: &str) -> DbResult<i64> {
    pool.with_conn(|conn| {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM responses WHERE refid = ?1",
            params![refid],
            |row| row.get(0),
        )?;
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        run_migrations(&pool).unwrap();
        pool
    }

    fn row(id: &str, refid: &str) -> ResponseRow {
        ResponseRow {
            id: id.to_string(),
            refid: refid.to_string(),
            name: Some("Ada".to_string()),
            secname: None,
            data: r#"{"q1":"yes"}"#.to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_create_and_list() {
        let pool = pool();
        create_response(&pool, &row("r1", "S1")).unwrap();
        create_response(&pool, &row("r2", "S1")).unwrap();
        create_response(&pool, &row("r3", "S2")).unwrap();

        let rows = list_responses_by_refid(&pool, "S1").unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        // Same timestamp: insertion order breaks the tie, newest first.
        assert_eq!(ids, vec!["r2", "r1"]);
        assert_eq!(rows[0].name.as_deref(), Some("Ada"));
        assert_eq!(count_responses_by_refid(&pool, "S1").unwrap(), 2);
        assert_eq!(count_responses_by_refid(&pool, "S3").unwrap(), 0);
    }

    #[test]
    fn test_bulk_insert() {
        let pool = pool();
        create_responses(&pool, &[row("r1", "S1"), row("r2", "S1")]).unwrap();
        assert_eq!(count_responses_by_refid(&pool, "S1").unwrap(), 2);
    }

    #[test]
    fn test_bulk_insert_is_atomic() {
        let pool = pool();
        // Second row reuses the primary key, so the whole batch must roll back.
        let result = create_responses(&pool, &[row("r1", "S1"), row("r1", "S1")]);
        assert!(result.is_err());
        assert_eq!(count_responses_by_refid(&pool, "S1").unwrap(), 0);
    }
}
