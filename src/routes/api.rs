//! Catalog resource routes.

use axum::{
    routing::get,
    Router,
};

use crate::handlers::{manufacturers, products};
use crate::state::AppState;

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/:id",
            get(products::read)
                .put(products::update)
                .delete(products::delete),
        )
        .with_state(state)
}

pub fn manufacturer_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(manufacturers::list).post(manufacturers::create))
        .route(
            "/:id",
            get(manufacturers::read)
                .put(manufacturers::update)
                .delete(manufacturers::delete),
        )
        .with_state(state)
}
