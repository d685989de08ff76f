use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::Appointment;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let appointments = vec![
        ("seed-001", "Rae", "Skin fade", "completed", 2026, 3, 3, 9, 0, 45),
        ("seed-002", "Rae", "Beard trim", "completed", 2026, 3, 3, 10, 30, 30),
        ("seed-003", "Marco", "Skin fade", "no-show", 2026, 3, 3, 14, 0, 45),
        ("seed-004", "Marco", "Classic cut", "completed", 2026, 3, 4, 11, 15, 60),
        ("seed-005", "Rae", "Classic cut", "cancelled", 2026, 3, 4, 16, 0, 45),
        ("seed-006", "Dana", "Hot towel shave", "completed", 2026, 3, 5, 9, 30, 40),
        ("seed-007", "Dana", "Skin fade", "completed", 2026, 3, 5, 17, 40, 45),
        ("seed-008", "Rae", "Beard trim", "no-show", 2026, 3, 6, 12, 0, 30),
        ("seed-009", "Marco", "Skin fade", "completed", 2026, 3, 6, 15, 30, 60),
        ("seed-010", "Dana", "Classic cut", "completed", 2026, 3, 7, 10, 0, 45),
        ("seed-011", "Rae", "Hot towel shave", "completed", 2026, 3, 7, 13, 30, 40),
        ("seed-012", "Marco", "Beard trim", "booked", 2026, 3, 7, 18, 15, 30),
    ];

    for (source_key, staff, service, status, year, month, day, hour, minute, duration) in
        appointments
    {
        let starts_at = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .context("invalid seed timestamp")?;

        sqlx::query(
            r#"
            INSERT INTO slot_insights.appointments
            (id, staff, service, status, starts_at, duration_minutes, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(staff)
        .bind(service)
        .bind(status)
        .bind(starts_at)
        .bind(duration as i64)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_appointments(
    pool: &PgPool,
    since_date: NaiveDate,
    staff: Option<&str>,
    service: Option<&str>,
) -> anyhow::Result<Vec<Appointment>> {
    let mut query = String::from(
        "SELECT id, staff, service, status, starts_at, duration_minutes \
         FROM slot_insights.appointments \
         WHERE starts_at >= $1",
    );

    if staff.is_some() {
        query.push_str(" AND staff = $2");
    } else if service.is_some() {
        query.push_str(" AND service = $2");
    }
    query.push_str(" ORDER BY starts_at");

    let mut rows = sqlx::query(&query).bind(since_date.and_time(NaiveTime::MIN));

    if let Some(value) = staff {
        rows = rows.bind(value);
    } else if let Some(value) = service {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut appointments = Vec::new();

    for row in records {
        appointments.push(Appointment {
            id: row.get("id"),
            staff: row.get("staff"),
            service: row.get("service"),
            status: row.get("status"),
            starts_at: row.get("starts_at"),
            duration_minutes: row.get("duration_minutes"),
        });
    }

    Ok(appointments)
}

pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<(usize, usize)> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        staff: String,
        service: String,
        status: String,
        starts_at: String,
        duration_minutes: i64,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        // Dirty rows are excluded, never fatal.
        let row = match result {
            Ok(row) => row,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let starts_at = match parse_start(&row.starts_at) {
            Some(starts_at) => starts_at,
            None => {
                skipped += 1;
                continue;
            }
        };

        if row.duration_minutes <= 0 {
            skipped += 1;
            continue;
        }

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO slot_insights.appointments
            (id, staff, service, status, starts_at, duration_minutes, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.staff)
        .bind(&row.service)
        .bind(&row.status)
        .bind(starts_at)
        .bind(row.duration_minutes)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok((inserted, skipped))
}

fn parse_start(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_timestamps_accept_common_formats() {
        assert!(parse_start("2026-03-02T14:30").is_some());
        assert!(parse_start("2026-03-02 14:30:00").is_some());
        assert!(parse_start(" 2026-03-02 14:30 ").is_some());
        assert!(parse_start("next tuesday").is_none());
        assert!(parse_start("").is_none());
    }
}
