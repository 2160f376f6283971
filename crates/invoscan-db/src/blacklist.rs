//! Blacklist storage.
//!
//! IBANs are stored normalized (no whitespace, upper-case) so that lookups
//! from the scanner, which only ever produces normalized candidates, are
//! exact matches.

use crate::error::{DatabaseError, Result};
use invoscan_core::config::MAX_IBAN_LENGTH;
use invoscan_core::{BlacklistEntry, Timestamp};
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Keeps `IN (...)` lists well below `SQLite`'s bound-parameter limit.
const LOOKUP_CHUNK_SIZE: usize = 500;

fn normalize(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn check_iban(iban: &str) -> Result<()> {
    if iban.len() < 5 || iban.len() > MAX_IBAN_LENGTH {
        return Err(DatabaseError::InvalidInput(format!(
            "IBAN must be 5 to {MAX_IBAN_LENGTH} characters, got {}",
            iban.len()
        )));
    }
    if !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DatabaseError::InvalidInput(
            "IBAN must contain only letters and digits".to_string(),
        ));
    }
    Ok(())
}

fn entry_from_row(row: (i64, String, String, String)) -> Result<BlacklistEntry> {
    let (id, iban, reason, created_at) = row;
    let created_at = Timestamp::from_rfc3339(&created_at).map_err(|e| {
        DatabaseError::Decode(format!("invalid created_at for blacklist entry {id}: {e}"))
    })?;

    Ok(BlacklistEntry {
        id,
        iban,
        reason,
        created_at,
    })
}

/// Add an IBAN to the blacklist.
///
/// # Errors
/// Returns `DatabaseError::AlreadyBlacklisted` if the IBAN is already listed
/// and `DatabaseError::InvalidInput` if it is empty, too long or contains
/// anything other than letters and digits.
pub async fn blacklist_iban(pool: &SqlitePool, iban: &str, reason: &str) -> Result<BlacklistEntry> {
    let iban = normalize(iban);
    check_iban(&iban)?;

    let created_at = Timestamp::now();
    let result = sqlx::query(
        r"
        INSERT INTO blacklisted_ibans (iban, reason, created_at)
        VALUES (?, ?, ?)
        ",
    )
    .bind(&iban)
    .bind(reason)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(DatabaseError::AlreadyBlacklisted(iban));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Blacklisted IBAN {} (id {})", iban, id);

    Ok(BlacklistEntry {
        id,
        iban,
        reason: reason.to_string(),
        created_at,
    })
}

/// Return the subset of `ibans` that is blacklisted.
///
/// Issues a single `IN (...)` query per chunk of candidates; an empty input
/// returns without touching the database.
pub async fn find_by_ibans(pool: &SqlitePool, ibans: &[String]) -> Result<HashSet<String>> {
    let mut found = HashSet::new();

    for chunk in ibans.chunks(LOOKUP_CHUNK_SIZE) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("SELECT iban FROM blacklisted_ibans WHERE iban IN ({placeholders})");

        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for iban in chunk {
            query = query.bind(iban);
        }

        found.extend(query.fetch_all(pool).await?);
    }

    Ok(found)
}

/// Whether a single IBAN is blacklisted.
pub async fn exists(pool: &SqlitePool, iban: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blacklisted_ibans WHERE iban = ?")
        .bind(normalize(iban))
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// List all entries, oldest first.
pub async fn list(pool: &SqlitePool) -> Result<Vec<BlacklistEntry>> {
    let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
        r"
        SELECT id, iban, reason, created_at
        FROM blacklisted_ibans
        ORDER BY id ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(entry_from_row).collect()
}

/// Remove an IBAN from the blacklist.
///
/// # Errors
/// Returns `DatabaseError::NotFound` if the IBAN is not listed.
pub async fn delete(pool: &SqlitePool, iban: &str) -> Result<()> {
    let iban = normalize(iban);
    let result = sqlx::query("DELETE FROM blacklisted_ibans WHERE iban = ?")
        .bind(&iban)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(iban));
    }

    tracing::info!("Removed IBAN {} from blacklist", iban);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn create_test_db() -> Database {
        let db = Database::new(":memory:", 1)
            .await
            .expect("create test database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    #[tokio::test]
    async fn test_blacklist_and_list() {
        let db = create_test_db().await;
        let pool = db.pool();

        let entry = blacklist_iban(pool, "fr76 3000 6000 0112 3456 7890 189", "fraud report")
            .await
            .expect("blacklist");
        assert_eq!(entry.iban, "FR7630006000011234567890189");
        assert_eq!(entry.reason, "fraud report");

        let entries = list(pool).await.expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected() {
        let db = create_test_db().await;
        let pool = db.pool();

        blacklist_iban(pool, "DE44500105175407324931", "first")
            .await
            .expect("blacklist");
        let err = blacklist_iban(pool, "DE44 5001 0517 5407 3249 31", "second")
            .await
            .expect_err("duplicate");

        assert!(matches!(err, DatabaseError::AlreadyBlacklisted(ref iban) if iban == "DE44500105175407324931"));
        assert_eq!(list(pool).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let db = create_test_db().await;
        let pool = db.pool();

        let too_long = "D".repeat(35);
        for bad in ["", "DE4", "DE44-5001-0517-5407-3249-31", too_long.as_str()] {
            let err = blacklist_iban(pool, bad, "bad").await.expect_err("invalid");
            assert!(matches!(err, DatabaseError::InvalidInput(_)), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_find_by_ibans() {
        let db = create_test_db().await;
        let pool = db.pool();

        blacklist_iban(pool, "FR7630006000011234567890189", "fraud")
            .await
            .expect("blacklist");
        blacklist_iban(pool, "GB29NWBK60161331926819", "closed account")
            .await
            .expect("blacklist");

        let hits = find_by_ibans(
            pool,
            &[
                "DE44500105175407324931".to_string(),
                "FR7630006000011234567890189".to_string(),
            ],
        )
        .await
        .expect("lookup");

        assert_eq!(hits, HashSet::from(["FR7630006000011234567890189".to_string()]));
        assert!(find_by_ibans(pool, &[]).await.expect("lookup").is_empty());
    }

    #[tokio::test]
    async fn test_find_by_ibans_large_batch() {
        let db = create_test_db().await;
        let pool = db.pool();

        blacklist_iban(pool, "GB29NWBK60161331926819", "closed account")
            .await
            .expect("blacklist");

        let mut batch: Vec<String> = (0..1200).map(|i| format!("XX00{i:018}")).collect();
        batch.push("GB29NWBK60161331926819".to_string());

        let hits = find_by_ibans(pool, &batch).await.expect("lookup");
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let db = create_test_db().await;
        let pool = db.pool();

        blacklist_iban(pool, "NL91ABNA0417164300", "test")
            .await
            .expect("blacklist");
        assert!(exists(pool, "nl91 abna 0417 1643 00").await.expect("exists"));

        delete(pool, "NL91ABNA0417164300").await.expect("delete");
        assert!(!exists(pool, "NL91ABNA0417164300").await.expect("exists"));

        let err = delete(pool, "NL91ABNA0417164300").await.expect_err("missing");
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
