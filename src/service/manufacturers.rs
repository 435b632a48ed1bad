//! Manufacturer CRUD. Deletion cascades to dependent products inside one
//! explicit transaction; the schema carries no implicit ON DELETE action.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::error::AppError;
use crate::model::{parse_datetime, Manufacturer, ManufacturerInput, ManufacturerPatch};
use crate::page::Page;
use crate::service::validation;
use crate::sql::{self, ManufacturerChanges};

const MANUFACTURER_SELECT: &str =
    "SELECT id, name, description, country_code, listed_date FROM manufacturer WHERE id = $1";

/// Product-id views for a set of manufacturers, one query for the whole page.
async fn load_product_ids(
    conn: &mut PgConnection,
    manufacturer_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, AppError> {
    if manufacturer_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i32)> = sqlx::query_as(
        "SELECT id, manufacturer_id FROM product WHERE manufacturer_id = ANY($1) ORDER BY id",
    )
    .bind(manufacturer_ids)
    .fetch_all(conn)
    .await?;
    let mut by_manufacturer: HashMap<i32, Vec<i32>> = HashMap::new();
    for (product_id, manufacturer_id) in rows {
        by_manufacturer
            .entry(manufacturer_id)
            .or_default()
            .push(product_id);
    }
    Ok(by_manufacturer)
}

pub async fn list(pool: &PgPool, page: Page) -> Result<(Vec<Manufacturer>, i64), AppError> {
    let q = sql::select_manufacturers(page);
    tracing::debug!(sql = %q.sql, "list manufacturers");
    let mut items: Vec<Manufacturer> = sqlx::query_as(&q.sql).fetch_all(pool).await?;

    let ids: Vec<i32> = items.iter().map(|m| m.id).collect();
    let mut conn = pool.acquire().await?;
    let mut product_ids = load_product_ids(&mut conn, &ids).await?;
    for m in &mut items {
        m.products = product_ids.remove(&m.id).unwrap_or_default();
    }

    let total: i64 = sqlx::query_scalar(&sql::count_manufacturers().sql)
        .fetch_one(pool)
        .await?;
    Ok((items, total))
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Manufacturer, AppError> {
    let mut manufacturer: Manufacturer = sqlx::query_as(MANUFACTURER_SELECT)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("manufacturer {id}")))?;
    let mut conn = pool.acquire().await?;
    let mut product_ids = load_product_ids(&mut conn, &[id]).await?;
    manufacturer.products = product_ids.remove(&id).unwrap_or_default();
    Ok(manufacturer)
}

struct NewManufacturer {
    name: String,
    description: String,
    country_code: String,
    listed_date: DateTime<Utc>,
}

fn prepare(input: ManufacturerInput) -> Result<NewManufacturer, AppError> {
    validation::validate_manufacturer_input(&input).into_result()?;
    let listed_date = input
        .listed_date
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| AppError::BadRequest("listedDate is not a valid date".into()))?;
    Ok(NewManufacturer {
        name: input.name.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        country_code: input.country_code.unwrap_or_default(),
        listed_date,
    })
}

pub async fn create(pool: &PgPool, input: ManufacturerInput) -> Result<Manufacturer, AppError> {
    let new = prepare(input)?;
    let manufacturer: Manufacturer = sqlx::query_as(
        "INSERT INTO manufacturer (name, description, country_code, listed_date) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, description, country_code, listed_date",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.country_code)
    .bind(new.listed_date)
    .fetch_one(pool)
    .await?;
    tracing::info!(id = manufacturer.id, "manufacturer created");
    Ok(manufacturer)
}

fn changes_from(patch: ManufacturerPatch) -> Result<ManufacturerChanges, AppError> {
    let listed_date = match &patch.listed_date {
        Some(Some(raw)) => Some(
            parse_datetime(raw)
                .ok_or_else(|| AppError::BadRequest("listedDate is not a valid date".into()))?,
        ),
        _ => None,
    };
    Ok(ManufacturerChanges {
        name: patch.name.flatten(),
        description: patch.description.flatten(),
        country_code: patch.country_code.flatten(),
        listed_date,
    })
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    patch: ManufacturerPatch,
) -> Result<Manufacturer, AppError> {
    validation::validate_manufacturer_patch(&patch).into_result()?;
    let changes = changes_from(patch)?;
    let mut tx = pool.begin().await?;

    let q = sql::update_manufacturer(id, &changes);
    tracing::debug!(sql = %q.sql, "update manufacturer");
    let mut query = sqlx::query_as::<_, Manufacturer>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    let mut manufacturer = query
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("manufacturer {id}")))?;

    let mut product_ids = load_product_ids(&mut tx, &[id]).await?;
    manufacturer.products = product_ids.remove(&id).unwrap_or_default();
    tx.commit().await?;
    Ok(manufacturer)
}

/// Remove a manufacturer and all of its products atomically.
pub async fn delete(pool: &PgPool, id: i32) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM manufacturer WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_none() {
        return Err(AppError::NotFound(format!("manufacturer {id}")));
    }

    let products = sqlx::query("DELETE FROM product WHERE manufacturer_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM manufacturer WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(
        id,
        cascaded_products = products.rows_affected(),
        "manufacturer deleted"
    );
    Ok(())
}
