//! Product handlers: list with filters/sort/pagination, create, read,
//! partial update, delete.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::model::{ProductInput, ProductPatch};
use crate::page::{Page, PRODUCT_PAGE_SIZE};
use crate::response;
use crate::service::products;
use crate::sql::{ProductFilter, ProductOrder};
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: \"{raw}\"")))
}

/// Translate the query string into filter/order/page plus the applied
/// parameters echoed into navigation links. Unknown parameters are ignored;
/// malformed values of known ones are 400s, distinct from a valid
/// beyond-range page.
fn parse_list_query(
    params: &HashMap<String, String>,
) -> Result<(ProductFilter, ProductOrder, Page, Vec<(String, String)>), AppError> {
    let mut filter = ProductFilter::default();
    let mut applied = Vec::new();

    if let Some(name) = params.get("name") {
        filter.name = Some(name.clone());
        applied.push(("name".to_string(), name.clone()));
    }
    if let Some(description) = params.get("description") {
        filter.description = Some(description.clone());
        applied.push(("description".to_string(), description.clone()));
    }
    if let Some(country_code) = params.get("manufacturer.countryCode") {
        filter.country_code = Some(country_code.clone());
        applied.push(("manufacturer.countryCode".to_string(), country_code.clone()));
    }
    if let Some(raw) = params.get("manufacturer.id") {
        let id = raw.trim().parse::<i32>().map_err(|_| {
            AppError::BadRequest(format!("manufacturer.id is not a number: \"{raw}\""))
        })?;
        filter.manufacturer_id = Some(id);
        applied.push(("manufacturer.id".to_string(), raw.clone()));
    }

    let order = match params.get("order[issueDate]") {
        None => ProductOrder::Id,
        Some(direction) => match direction.to_ascii_lowercase().as_str() {
            "asc" => ProductOrder::IssueDateAsc,
            "desc" => ProductOrder::IssueDateDesc,
            _ => {
                return Err(AppError::BadRequest(format!(
                    "order[issueDate] must be asc or desc: \"{direction}\""
                )))
            }
        },
    };
    match order {
        ProductOrder::IssueDateAsc => applied.push(("order[issueDate]".to_string(), "asc".into())),
        ProductOrder::IssueDateDesc => {
            applied.push(("order[issueDate]".to_string(), "desc".into()))
        }
        ProductOrder::Id => {}
    }

    let page = Page::from_param(params.get("page").map(String::as_str), PRODUCT_PAGE_SIZE)?;
    Ok((filter, order, page, applied))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let (filter, order, page, applied) = parse_list_query(&params)?;
    let (items, total) = products::list(&state.pool, &filter, order, page).await?;
    let members = items.iter().map(|p| p.to_hydra(false)).collect();
    Ok(Json(response::collection(
        "Product",
        "/api/products",
        members,
        &page.meta(total),
        &applied,
    )))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = ProductInput::from_json(body)?;
    let product = products::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(product.to_hydra(true))))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let product = products::get(&state.pool, parse_id(&id)?).await?;
    Ok(Json(product.to_hydra(true)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let patch = ProductPatch::from_json(&body)?;
    let product = products::update(&state.pool, parse_id(&id)?, patch).await?;
    Ok(Json(product.to_hydra(true)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    products::delete(&state.pool, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
