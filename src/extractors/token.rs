//! Extract the API token from the request (x-api-token header).

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the caller's API token.
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Extractor for the optional `x-api-token` header value.
#[derive(Clone, Debug)]
pub struct ApiTokenHeader(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ApiTokenHeader
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(API_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(ApiTokenHeader(value))
    }
}
