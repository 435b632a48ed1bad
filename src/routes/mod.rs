//! Routers: authenticated /api resources plus open service routes.

pub mod api;
pub mod common;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The complete application: `/api/*` behind token auth, service routes
/// open, HTTP tracing and a request body cap on everything.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/products", api::product_routes(state.clone()))
        .nest("/manufacturers", api::manufacturer_routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_api_token,
        ));

    Router::new()
        .merge(common::common_routes(state))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}
