//! Product: a catalog item owned by exactly one manufacturer.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::error::AppError;
use crate::model::{format_datetime, manufacturer_iri, product_iri, string_field};

/// A persisted product row. `manufacturer_id` always resolves to an
/// existing manufacturer (enforced on write, NOT NULL in schema).
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Product {
    pub id: i32,
    pub mpn: String,
    pub name: String,
    pub description: String,
    pub issue_date: DateTime<Utc>,
    pub manufacturer_id: i32,
}

impl Product {
    /// Wire representation. Standalone responses carry `@context`;
    /// collection members do not.
    pub fn to_hydra(&self, with_context: bool) -> Value {
        let mut body = json!({
            "@id": product_iri(self.id),
            "@type": "Product",
            "id": self.id,
            "mpn": self.mpn,
            "name": self.name,
            "description": self.description,
            "issueDate": format_datetime(&self.issue_date),
            "manufacturer": manufacturer_iri(self.manufacturer_id),
        });
        if with_context {
            body.as_object_mut()
                .expect("object literal")
                .insert("@context".into(), json!("/api/contexts/Product"));
        }
        body
    }
}

/// Resolve a manufacturer reference from a request body: an IRI
/// (`/api/manufacturers/1`) or a bare integer id. Anything else is
/// unresolvable and reported as a null manufacturer by validation.
pub fn parse_manufacturer_ref(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .filter(|v| *v > 0),
        Value::String(s) => s
            .strip_prefix("/api/manufacturers/")?
            .parse::<i32>()
            .ok()
            .filter(|v| *v > 0),
        _ => None,
    }
}

/// Create payload. All fields optional at the serde layer so validation can
/// report every missing field at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub mpn: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<Value>,
}

impl ProductInput {
    pub fn from_json(body: Value) -> Result<Self, AppError> {
        serde_json::from_value(body)
            .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
    }
}

/// Partial update payload. The outer Option records field presence, the
/// inner one a JSON null, so `{"mpn": null}` violates NotNull while an
/// absent `mpn` leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub mpn: Option<Option<String>>,
    pub name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub issue_date: Option<Option<String>>,
    pub manufacturer: Option<Option<i32>>,
}

impl ProductPatch {
    /// Unknown keys are ignored; known keys with a wrong JSON type are a 400.
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::BadRequest("request body must be a JSON object".into()))?;
        let mut patch = ProductPatch::default();
        for (key, value) in obj {
            match key.as_str() {
                "mpn" => patch.mpn = Some(string_field(value, "mpn")?),
                "name" => patch.name = Some(string_field(value, "name")?),
                "description" => patch.description = Some(string_field(value, "description")?),
                "issueDate" => patch.issue_date = Some(string_field(value, "issueDate")?),
                "manufacturer" => patch.manufacturer = Some(parse_manufacturer_ref(value)),
                _ => {}
            }
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.mpn.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.issue_date.is_none()
            && self.manufacturer.is_none()
    }
}
