use anyhow::Result;
use sqlx::PgPool;
use time::{Date, Duration};

use crate::domain::{Consumer, MeterReading};

/// List every consumer that has at least one reading.
pub async fn consumers(pool: &PgPool) -> Result<Vec<Consumer>> {
    let rows = sqlx::query_as::<_, Consumer>(
        r#"
        SELECT DISTINCT ON (scno)
            scno       AS consumer_id,
            short_name
        FROM ht_blp
        ORDER BY scno
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch the time-ordered readings of one consumer for the local days
/// `[start, end)`.
///
/// The upper bound is widened by half an hour so the `00:00` sample that closes
/// hour 23 of the last day is included.
pub async fn readings_between(
    pool: &PgPool,
    consumer_id: &str,
    start: Date,
    end: Date,
) -> Result<Vec<MeterReading>> {
    let lower = start.midnight();
    let upper = end.midnight() + Duration::minutes(30);

    let rows = sqlx::query_as::<_, MeterReading>(
        r#"
        SELECT
            scno   AS consumer_id,
            ts,
            wh_imp
        FROM ht_blp
        WHERE scno = $1
          AND ts >= $2
          AND ts <  $3
        ORDER BY ts
        "#,
    )
    .bind(consumer_id)
    .bind(lower)
    .bind(upper)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch the full time-ordered history of one consumer.
pub async fn consumer_history(pool: &PgPool, consumer_id: &str) -> Result<Vec<MeterReading>> {
    let rows = sqlx::query_as::<_, MeterReading>(
        r#"
        SELECT
            scno   AS consumer_id,
            ts,
            wh_imp
        FROM ht_blp
        WHERE scno = $1
        ORDER BY ts
        "#,
    )
    .bind(consumer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch the full history of every consumer, ordered by consumer then time.
///
/// Used by whole-population computations such as ranking; the result can be
/// large, callers should group it once and discard it.
pub async fn all_readings(pool: &PgPool) -> Result<Vec<MeterReading>> {
    let rows = sqlx::query_as::<_, MeterReading>(
        r#"
        SELECT
            scno   AS consumer_id,
            ts,
            wh_imp
        FROM ht_blp
        ORDER BY scno, ts
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
