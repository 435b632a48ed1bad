//! Product CRUD against PostgreSQL. Writes run as single transactions and
//! resolve the manufacturer reference before touching the product table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{AppError, ViolationList};
use crate::model::{parse_datetime, parse_manufacturer_ref, Product, ProductInput, ProductPatch};
use crate::page::Page;
use crate::service::validation;
use crate::sql::{self, ProductChanges, ProductFilter, ProductOrder, QueryBuf};

const PRODUCT_SELECT: &str =
    "SELECT id, mpn, name, description, issue_date, manufacturer_id FROM product WHERE id = $1";

/// One page of the filtered listing plus the filtered total count.
pub async fn list(
    pool: &PgPool,
    filter: &ProductFilter,
    order: ProductOrder,
    page: Page,
) -> Result<(Vec<Product>, i64), AppError> {
    let q = sql::select_products(filter, order, page);
    tracing::debug!(sql = %q.sql, params = ?q.params, "list products");
    let mut query = sqlx::query_as::<_, Product>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    let items = query.fetch_all(pool).await?;

    let c = sql::count_products(filter);
    let mut count = sqlx::query_scalar::<_, i64>(&c.sql);
    for p in &c.params {
        count = count.bind(p.clone());
    }
    let total = count.fetch_one(pool).await?;
    Ok((items, total))
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>(PRODUCT_SELECT)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

struct NewProduct {
    mpn: String,
    name: String,
    description: String,
    issue_date: DateTime<Utc>,
    manufacturer_id: i32,
}

/// Validate a create payload and extract its typed fields. Field-rule
/// violations become a 422; an unparseable date is a 400.
fn prepare(input: ProductInput) -> Result<NewProduct, AppError> {
    validation::validate_product_input(&input).into_result()?;
    let issue_date = input
        .issue_date
        .as_deref()
        .and_then(parse_datetime)
        .ok_or_else(|| AppError::BadRequest("issueDate is not a valid date".into()))?;
    let manufacturer_id = input
        .manufacturer
        .as_ref()
        .and_then(parse_manufacturer_ref)
        .ok_or_else(|| AppError::BadRequest("manufacturer reference is invalid".into()))?;
    Ok(NewProduct {
        mpn: input.mpn.unwrap_or_default(),
        name: input.name.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        issue_date,
        manufacturer_id,
    })
}

fn manufacturer_null_violation() -> AppError {
    let mut list = ViolationList::new();
    list.add("manufacturer", validation::NOT_NULL);
    AppError::Validation(list)
}

pub async fn create(pool: &PgPool, input: ProductInput) -> Result<Product, AppError> {
    let new = prepare(input)?;
    let mut tx = pool.begin().await?;

    // The reference must resolve to a live row; an id pointing nowhere is
    // the same violation as a missing manufacturer.
    let manufacturer: Option<i32> = sqlx::query_scalar("SELECT id FROM manufacturer WHERE id = $1")
        .bind(new.manufacturer_id)
        .fetch_optional(&mut *tx)
        .await?;
    if manufacturer.is_none() {
        return Err(manufacturer_null_violation());
    }

    let product: Product = sqlx::query_as(
        "INSERT INTO product (mpn, name, description, issue_date, manufacturer_id) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, mpn, name, description, issue_date, manufacturer_id",
    )
    .bind(&new.mpn)
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.issue_date)
    .bind(new.manufacturer_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(id = product.id, "product created");
    Ok(product)
}

fn changes_from(patch: ProductPatch) -> Result<ProductChanges, AppError> {
    let issue_date = match &patch.issue_date {
        Some(Some(raw)) => Some(
            parse_datetime(raw)
                .ok_or_else(|| AppError::BadRequest("issueDate is not a valid date".into()))?,
        ),
        _ => None,
    };
    Ok(ProductChanges {
        mpn: patch.mpn.flatten(),
        name: patch.name.flatten(),
        description: patch.description.flatten(),
        issue_date,
        manufacturer_id: patch.manufacturer.flatten(),
    })
}

/// Partial update: only fields present in the patch are written; the rest
/// keep their stored values.
pub async fn update(pool: &PgPool, id: i32, patch: ProductPatch) -> Result<Product, AppError> {
    validation::validate_product_patch(&patch).into_result()?;
    let changes = changes_from(patch)?;
    let mut tx = pool.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM product WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_none() {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    if let Some(manufacturer_id) = changes.manufacturer_id {
        let manufacturer: Option<i32> =
            sqlx::query_scalar("SELECT id FROM manufacturer WHERE id = $1")
                .bind(manufacturer_id)
                .fetch_optional(&mut *tx)
                .await?;
        if manufacturer.is_none() {
            return Err(manufacturer_null_violation());
        }
    }

    let q: QueryBuf = sql::update_product(id, &changes);
    tracing::debug!(sql = %q.sql, "update product");
    let mut query = sqlx::query_as::<_, Product>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    let product = query
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    tx.commit().await?;
    Ok(product)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM product WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    tracing::info!(id, "product deleted");
    Ok(())
}
