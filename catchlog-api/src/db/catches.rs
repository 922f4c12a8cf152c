//! Catch persistence

use catchlog_common::models::{Catch, CatchFields};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::ingest::{CatchUpdate, NewCatch};

fn catch_from_row(row: &SqliteRow) -> sqlx::Result<Catch> {
    let fields: Json<CatchFields> = row.try_get("fields")?;
    let attachments: Json<Vec<String>> = row.try_get("attachments")?;
    Ok(Catch {
        id: row.try_get("id")?,
        report_id: row.try_get("report_id")?,
        attachments: attachments.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        fields: fields.0,
    })
}

/// Catches of one trip, oldest first
pub async fn load_catches_for_trip(pool: &SqlitePool, trip_id: &str) -> sqlx::Result<Vec<Catch>> {
    let rows = sqlx::query(
        r#"
        SELECT id, report_id, fields, attachments, created_at, updated_at
        FROM report_fish
        WHERE report_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(catch_from_row).collect()
}

/// Catches of every trip (or every trip of one user), oldest first
pub async fn load_catches_for_trips(
    pool: &SqlitePool,
    user_email: Option<&str>,
) -> sqlx::Result<Vec<Catch>> {
    let rows = match user_email {
        Some(email) => {
            sqlx::query(
                r#"
                SELECT f.id, f.report_id, f.fields, f.attachments, f.created_at, f.updated_at
                FROM report_fish f
                JOIN reports r ON r.id = f.report_id
                WHERE r.user_email = ?
                ORDER BY f.created_at, f.rowid
                "#,
            )
            .bind(email)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, report_id, fields, attachments, created_at, updated_at
                FROM report_fish
                ORDER BY created_at, rowid
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(catch_from_row).collect()
}

/// Insert one catch on an open connection or transaction; returns the new id
pub async fn insert_catch(
    conn: &mut SqliteConnection,
    catch: &NewCatch,
    now: DateTime<Utc>,
) -> sqlx::Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO report_fish (id, report_id, fields, attachments, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&catch.trip_id)
    .bind(Json(&catch.fields))
    .bind(Json(&catch.attachments))
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

/// Insert catches in one transaction: either all are stored or none
pub async fn insert_catches(pool: &SqlitePool, catches: &[NewCatch]) -> sqlx::Result<Vec<String>> {
    if catches.is_empty() {
        return Ok(Vec::new());
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(catches.len());
    for catch in catches {
        ids.push(insert_catch(&mut tx, catch, now).await?);
    }
    tx.commit().await?;

    debug!(count = ids.len(), "Inserted catches");
    Ok(ids)
}

/// Merge submitted fields into a stored catch and replace its attachments
///
/// Only touches the catch if it belongs to `trip_id`. Returns false when
/// nothing matched.
pub async fn update_catch(
    pool: &SqlitePool,
    trip_id: &str,
    update: &CatchUpdate,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE report_fish SET
            fields = json_patch(fields, ?),
            attachments = ?,
            updated_at = ?
        WHERE id = ? AND report_id = ?
        "#,
    )
    .bind(Json(&update.fields))
    .bind(Json(&update.attachments))
    .bind(Utc::now())
    .bind(&update.id)
    .bind(trip_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Apply all updates concurrently; the first failure fails the batch
pub async fn update_catches(
    pool: &SqlitePool,
    trip_id: &str,
    updates: &[CatchUpdate],
) -> sqlx::Result<usize> {
    let applied = try_join_all(updates.iter().map(|u| update_catch(pool, trip_id, u))).await?;
    let count = applied.into_iter().filter(|hit| *hit).count();
    debug!(trip_id, count, "Updated catches");
    Ok(count)
}
