//! Typed errors, violation lists, and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One failed field constraint, e.g. `manufacturer: This value should not be null.`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Violation {
    #[serde(rename = "propertyPath")]
    pub property_path: &'static str,
    pub message: &'static str,
}

/// All violations found for one request. Writes abort before touching the
/// store when this is non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViolationList(pub Vec<Violation>);

impl ViolationList {
    pub fn new() -> Self {
        ViolationList(Vec::new())
    }

    pub fn add(&mut self, property_path: &'static str, message: &'static str) {
        self.0.push(Violation {
            property_path,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `field: message` lines, one per violation.
    pub fn description(&self) -> String {
        self.0
            .iter()
            .map(|v| format!("{}: {}", v.property_path, v.message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ok when empty, `AppError::Validation` otherwise.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {}", .0.description())]
    Validation(ViolationList),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

fn hydra_error(status: StatusCode, description: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "@context": "/api/contexts/Error",
            "@type": "hydra:Error",
            "hydra:title": "An error occurred",
            "hydra:description": description.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(list) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "@context": "/api/contexts/ConstraintViolationList",
                    "@type": "ConstraintViolationList",
                    "hydra:title": "An error occurred",
                    "hydra:description": list.description(),
                    "violations": list.0,
                })),
            )
                .into_response(),
            AppError::NotFound(what) => {
                tracing::debug!(what = %what, "not found");
                hydra_error(StatusCode::NOT_FOUND, "Not Found")
            }
            AppError::BadRequest(msg) => hydra_error(StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials." })),
            )
                .into_response(),
            AppError::Db(sqlx::Error::RowNotFound) => {
                hydra_error(StatusCode::NOT_FOUND, "Not Found")
            }
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                hydra_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_joins_violations_in_order() {
        let mut list = ViolationList::new();
        list.add("name", "This value should not be blank.");
        list.add("manufacturer", "This value should not be null.");
        assert_eq!(
            list.description(),
            "name: This value should not be blank.\nmanufacturer: This value should not be null."
        );
    }

    #[test]
    fn empty_list_converts_to_ok() {
        assert!(ViolationList::new().into_result().is_ok());
    }

    #[test]
    fn non_empty_list_converts_to_validation_error() {
        let mut list = ViolationList::new();
        list.add("issueDate", "This value should not be null.");
        match list.into_result() {
            Err(AppError::Validation(l)) => assert_eq!(l.0.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
