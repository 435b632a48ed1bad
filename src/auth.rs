//! Token authentication against the api_token table.
//!
//! Issuance and rotation belong to an external operator workflow; this
//! module only checks presence of the presented token and answers 401
//! before any handler runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

use crate::error::AppError;
use crate::extractors::ApiTokenHeader;
use crate::state::AppState;

async fn token_exists(pool: &PgPool, token: &str) -> Result<bool, AppError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM api_token WHERE token = $1)")
        .bind(token)
        .fetch_one(pool)
        .await?;
    Ok(exists.0)
}

/// Middleware for all `/api` routes: a missing or unknown token is rejected
/// with `401 Invalid credentials.` and the request never reaches a handler.
pub async fn require_api_token(
    State(state): State<AppState>,
    ApiTokenHeader(token): ApiTokenHeader,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = token else {
        return AppError::Unauthorized.into_response();
    };
    match token_exists(&state.pool, &token).await {
        Ok(true) => next.run(request).await,
        Ok(false) => AppError::Unauthorized.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Idempotent token provisioning, used at startup for `CATALOG_API_TOKEN`
/// and by tests.
pub async fn provision_token(pool: &PgPool, token: &str, label: &str) -> Result<(), AppError> {
    sqlx::query("INSERT INTO api_token (token, label) VALUES ($1, $2) ON CONFLICT (token) DO NOTHING")
        .bind(token)
        .bind(label)
        .execute(pool)
        .await?;
    Ok(())
}

/// Generate and store a token when none is configured, so a fresh install
/// is reachable. The token is logged once at startup.
pub async fn ensure_bootstrap_token(pool: &PgPool) -> Result<(), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_token")
        .fetch_one(pool)
        .await?;
    if count == 0 {
        let token = uuid::Uuid::new_v4().simple().to_string();
        provision_token(pool, &token, "bootstrap").await?;
        tracing::warn!(%token, "no API token configured; generated a bootstrap token");
    }
    Ok(())
}
