//! Trip report persistence

use catchlog_common::models::{Trip, TripFields, TripWithCatches, STATUS_PENDING};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use super::catches::{insert_catch, load_catches_for_trip, load_catches_for_trips};
use crate::ingest::NewCatch;

const TRIP_COLUMNS: &str = "id, nickname, city, boat, landing, trip_type, setup, report, \
     user_email, trip_date, status, conditions, anglers, pictures, created_at, updated_at";

fn trip_from_row(row: &SqliteRow) -> sqlx::Result<Trip> {
    let pictures: Json<Vec<String>> = row.try_get("pictures")?;
    Ok(Trip {
        id: row.try_get("id")?,
        nickname: row.try_get("nickname")?,
        city: row.try_get("city")?,
        boat: row.try_get("boat")?,
        landing: row.try_get("landing")?,
        trip_type: row.try_get("trip_type")?,
        setup: row.try_get("setup")?,
        report: row.try_get("report")?,
        user_email: row.try_get("user_email")?,
        trip_date: row.try_get::<Option<DateTime<Utc>>, _>("trip_date")?,
        status: row.try_get("status")?,
        conditions: row.try_get("conditions")?,
        anglers: row.try_get("anglers")?,
        pictures: pictures.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create a trip and its catches in one transaction
///
/// The trip always starts as pending; `fields.status` is ignored.
pub async fn create_trip_with_catches(
    pool: &SqlitePool,
    trip_id: &str,
    fields: &TripFields,
    pictures: &[String],
    catches: &[NewCatch],
) -> sqlx::Result<Trip> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO reports (
            id, nickname, city, boat, landing, trip_type, setup, report,
            user_email, trip_date, status, conditions, anglers, pictures,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(trip_id)
    .bind(&fields.nickname)
    .bind(&fields.city)
    .bind(&fields.boat)
    .bind(&fields.landing)
    .bind(&fields.trip_type)
    .bind(&fields.setup)
    .bind(&fields.report)
    .bind(&fields.user_email)
    .bind(fields.trip_date)
    .bind(STATUS_PENDING)
    .bind(fields.conditions)
    .bind(fields.anglers)
    .bind(Json(pictures))
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for catch in catches {
        insert_catch(&mut tx, catch, now).await?;
    }

    tx.commit().await?;

    Ok(Trip {
        id: trip_id.to_string(),
        nickname: fields.nickname.clone(),
        city: fields.city.clone(),
        boat: fields.boat.clone(),
        landing: fields.landing.clone(),
        trip_type: fields.trip_type.clone(),
        setup: fields.setup.clone(),
        report: fields.report.clone(),
        user_email: fields.user_email.clone(),
        trip_date: fields.trip_date,
        status: STATUS_PENDING.to_string(),
        conditions: fields.conditions,
        anglers: fields.anglers,
        pictures: pictures.to_vec(),
        created_at: now,
        updated_at: now,
    })
}

/// Load a trip without its catches
pub async fn load_trip(pool: &SqlitePool, trip_id: &str) -> sqlx::Result<Option<Trip>> {
    let query = format!("SELECT {} FROM reports WHERE id = ?", TRIP_COLUMNS);
    let row = sqlx::query(&query)
        .bind(trip_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(trip_from_row).transpose()
}

/// Load a trip with its catches in creation order
pub async fn load_trip_with_catches(
    pool: &SqlitePool,
    trip_id: &str,
) -> sqlx::Result<Option<TripWithCatches>> {
    let Some(trip) = load_trip(pool, trip_id).await? else {
        return Ok(None);
    };
    let fishes = load_catches_for_trip(pool, trip_id).await?;
    Ok(Some(TripWithCatches { trip, fishes }))
}

/// List trips with their catches, optionally only those of one user
pub async fn list_trips_with_catches(
    pool: &SqlitePool,
    user_email: Option<&str>,
) -> sqlx::Result<Vec<TripWithCatches>> {
    let rows = match user_email {
        Some(email) => {
            let query = format!(
                "SELECT {} FROM reports WHERE user_email = ? ORDER BY created_at, rowid",
                TRIP_COLUMNS
            );
            sqlx::query(&query).bind(email).fetch_all(pool).await?
        }
        None => {
            let query = format!("SELECT {} FROM reports ORDER BY created_at, rowid", TRIP_COLUMNS);
            sqlx::query(&query).fetch_all(pool).await?
        }
    };

    let trips = rows
        .iter()
        .map(trip_from_row)
        .collect::<sqlx::Result<Vec<Trip>>>()?;

    let mut by_trip: HashMap<String, Vec<_>> = HashMap::new();
    for catch in load_catches_for_trips(pool, user_email).await? {
        by_trip.entry(catch.report_id.clone()).or_default().push(catch);
    }

    Ok(trips
        .into_iter()
        .map(|trip| {
            let fishes = by_trip.remove(&trip.id).unwrap_or_default();
            TripWithCatches { trip, fishes }
        })
        .collect())
}

/// Apply a partial update: absent fields keep their stored value
///
/// `pictures` is always written. Returns false if the trip does not exist.
pub async fn update_trip(
    pool: &SqlitePool,
    trip_id: &str,
    fields: &TripFields,
    pictures: &[String],
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reports SET
            nickname = COALESCE(?, nickname),
            city = COALESCE(?, city),
            boat = COALESCE(?, boat),
            landing = COALESCE(?, landing),
            trip_type = COALESCE(?, trip_type),
            setup = COALESCE(?, setup),
            report = COALESCE(?, report),
            user_email = COALESCE(?, user_email),
            trip_date = COALESCE(?, trip_date),
            status = COALESCE(?, status),
            conditions = COALESCE(?, conditions),
            anglers = COALESCE(?, anglers),
            pictures = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.nickname)
    .bind(&fields.city)
    .bind(&fields.boat)
    .bind(&fields.landing)
    .bind(&fields.trip_type)
    .bind(&fields.setup)
    .bind(&fields.report)
    .bind(&fields.user_email)
    .bind(fields.trip_date)
    .bind(&fields.status)
    .bind(fields.conditions)
    .bind(fields.anglers)
    .bind(Json(pictures))
    .bind(Utc::now())
    .bind(trip_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a trip and its catches; returns false if the trip does not exist
pub async fn delete_trip(pool: &SqlitePool, trip_id: &str) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM report_fish WHERE report_id = ?")
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
