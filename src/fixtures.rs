//! Deterministic demo data: 5 manufacturers, 100 products.

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;

use crate::error::AppError;

const MANUFACTURERS: &[(&str, &str, &str)] = &[
    ("Acme Tooling", "Precision tooling and fixtures", "USA"),
    ("Nordwerk GmbH", "Industrial fasteners and fittings", "DEU"),
    ("Sakura Precision", "Compact drive components", "JPN"),
    ("Lyon Mecanique", "Hydraulic assemblies", "FRA"),
    ("Brixton Castings", "Cast housings and brackets", "GBR"),
];

const PRODUCT_COUNT: usize = 100;

fn fixture_date(year: i32, month: u32, day: u32) -> Result<chrono::DateTime<Utc>, AppError> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            AppError::BadRequest(format!("invalid fixture date {year}-{month:02}-{day:02}"))
        })
}

/// Seed demo data unless products already exist. Returns whether anything
/// was inserted. Everything is derived from fixed constants so repeated
/// runs against a fresh database produce identical rows.
pub async fn seed_demo(pool: &PgPool) -> Result<bool, AppError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    let listed = fixture_date(2020, 3, 1)?;
    let issued_base = fixture_date(2021, 1, 1)?;

    let mut tx = pool.begin().await?;
    let mut manufacturer_ids = Vec::with_capacity(MANUFACTURERS.len());
    for (index, (name, description, country_code)) in MANUFACTURERS.iter().enumerate() {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO manufacturer (name, description, country_code, listed_date) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(country_code)
        .bind(listed + Duration::days(index as i64 * 30))
        .fetch_one(&mut *tx)
        .await?;
        manufacturer_ids.push(id);
    }

    for i in 0..PRODUCT_COUNT {
        let manufacturer_id = manufacturer_ids[i % manufacturer_ids.len()];
        sqlx::query(
            "INSERT INTO product (mpn, name, description, issue_date, manufacturer_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(format!("MPN-{:04}", i + 1))
        .bind(format!("Product {}", i + 1))
        .bind(format!("Demo catalog product number {}", i + 1))
        .bind(issued_base + Duration::days(i as i64))
        .bind(manufacturer_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        manufacturers = MANUFACTURERS.len(),
        products = PRODUCT_COUNT,
        "demo data seeded"
    );
    Ok(true)
}
