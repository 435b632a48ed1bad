//! Manufacturer: owns an ordered collection of products.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::error::AppError;
use crate::model::{format_datetime, manufacturer_iri, product_iri, string_field};

/// A persisted manufacturer row. `products` is the id view of dependent
/// products, loaded alongside the row by the service layer.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Manufacturer {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub country_code: String,
    pub listed_date: DateTime<Utc>,
    #[sqlx(skip)]
    pub products: Vec<i32>,
}

impl Manufacturer {
    pub fn to_hydra(&self, with_context: bool) -> Value {
        let products: Vec<String> = self.products.iter().map(|id| product_iri(*id)).collect();
        let mut body = json!({
            "@id": manufacturer_iri(self.id),
            "@type": "Manufacturer",
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "countryCode": self.country_code,
            "listedDate": format_datetime(&self.listed_date),
            "products": products,
        });
        if with_context {
            body.as_object_mut()
                .expect("object literal")
                .insert("@context".into(), json!("/api/contexts/Manufacturer"));
        }
        body
    }
}

/// Create payload; fields stay optional so validation reports them together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub listed_date: Option<String>,
}

impl ManufacturerInput {
    pub fn from_json(body: Value) -> Result<Self, AppError> {
        serde_json::from_value(body)
            .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
    }
}

/// Partial update payload; see `ProductPatch` for the presence convention.
#[derive(Debug, Default)]
pub struct ManufacturerPatch {
    pub name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub country_code: Option<Option<String>>,
    pub listed_date: Option<Option<String>>,
}

impl ManufacturerPatch {
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::BadRequest("request body must be a JSON object".into()))?;
        let mut patch = ManufacturerPatch::default();
        for (key, value) in obj {
            match key.as_str() {
                "name" => patch.name = Some(string_field(value, "name")?),
                "description" => patch.description = Some(string_field(value, "description")?),
                "countryCode" => patch.country_code = Some(string_field(value, "countryCode")?),
                "listedDate" => patch.listed_date = Some(string_field(value, "listedDate")?),
                _ => {}
            }
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.country_code.is_none()
            && self.listed_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hydra_item_lists_product_iris_in_order() {
        let m = Manufacturer {
            id: 1,
            name: "Acme Tooling".into(),
            description: "Precision tooling".into(),
            country_code: "USA".into(),
            listed_date: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            products: vec![4, 9],
        };
        let body = m.to_hydra(true);
        assert_eq!(body["@context"], "/api/contexts/Manufacturer");
        assert_eq!(body["@id"], "/api/manufacturers/1");
        assert_eq!(body["countryCode"], "USA");
        assert_eq!(
            body["products"],
            json!(["/api/products/4", "/api/products/9"])
        );
    }

    #[test]
    fn patch_tracks_presence_per_field() {
        let patch =
            ManufacturerPatch::from_json(&json!({ "countryCode": "DEU", "listedDate": null }))
                .unwrap();
        assert_eq!(patch.country_code, Some(Some("DEU".into())));
        assert_eq!(patch.listed_date, Some(None));
        assert!(patch.name.is_none());
    }
}
