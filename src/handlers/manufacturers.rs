//! Manufacturer handlers. The listing paginates but takes no filters;
//! deleting cascades to the manufacturer's products.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::model::{ManufacturerInput, ManufacturerPatch};
use crate::page::{Page, MANUFACTURER_PAGE_SIZE};
use crate::response;
use crate::service::manufacturers;
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("invalid manufacturer id: \"{raw}\"")))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let page = Page::from_param(params.get("page").map(String::as_str), MANUFACTURER_PAGE_SIZE)?;
    let (items, total) = manufacturers::list(&state.pool, page).await?;
    let members = items.iter().map(|m| m.to_hydra(false)).collect();
    Ok(Json(response::collection(
        "Manufacturer",
        "/api/manufacturers",
        members,
        &page.meta(total),
        &[],
    )))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = ManufacturerInput::from_json(body)?;
    let manufacturer = manufacturers::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(manufacturer.to_hydra(true))))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let manufacturer = manufacturers::get(&state.pool, parse_id(&id)?).await?;
    Ok(Json(manufacturer.to_hydra(true)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let patch = ManufacturerPatch::from_json(&body)?;
    let manufacturer = manufacturers::update(&state.pool, parse_id(&id)?, patch).await?;
    Ok(Json(manufacturer.to_hydra(true)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    manufacturers::delete(&state.pool, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
