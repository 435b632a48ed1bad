//! Field validation producing violation lists.
//!
//! Every rule that fails is reported, not just the first; the caller aborts
//! the write before any state is touched when the list is non-empty.
//! Violations appear in entity field declaration order.

use crate::error::ViolationList;
use crate::model::{ManufacturerInput, ManufacturerPatch, ProductInput, ProductPatch};

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const NOT_NULL: &str = "This value should not be null.";
pub const COUNTRY_CODE_TOO_LONG: &str =
    "This value is too long. It should have 3 characters or less.";

const COUNTRY_CODE_MAX: usize = 3;

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// NotBlank over an optional field: absent, null, and whitespace-only all fail.
fn check_not_blank(list: &mut ViolationList, field: &'static str, value: Option<&str>) {
    match value {
        Some(s) if !is_blank(s) => {}
        _ => list.add(field, NOT_BLANK),
    }
}

fn check_country_code(list: &mut ViolationList, value: Option<&str>) {
    check_not_blank(list, "countryCode", value);
    if let Some(s) = value {
        if s.chars().count() > COUNTRY_CODE_MAX {
            list.add("countryCode", COUNTRY_CODE_TOO_LONG);
        }
    }
}

pub fn validate_product_input(input: &ProductInput) -> ViolationList {
    let mut list = ViolationList::new();
    // NotNull: presence is required, the empty string is fine.
    if input.mpn.is_none() {
        list.add("mpn", NOT_NULL);
    }
    check_not_blank(&mut list, "name", input.name.as_deref());
    check_not_blank(&mut list, "description", input.description.as_deref());
    if input.issue_date.is_none() {
        list.add("issueDate", NOT_NULL);
    }
    let manufacturer = input
        .manufacturer
        .as_ref()
        .and_then(crate::model::parse_manufacturer_ref);
    if manufacturer.is_none() {
        list.add("manufacturer", NOT_NULL);
    }
    list
}

/// Only fields present in the patch are validated; a present-but-null value
/// violates the field's rule.
pub fn validate_product_patch(patch: &ProductPatch) -> ViolationList {
    let mut list = ViolationList::new();
    if patch.mpn == Some(None) {
        list.add("mpn", NOT_NULL);
    }
    if let Some(name) = &patch.name {
        check_not_blank(&mut list, "name", name.as_deref());
    }
    if let Some(description) = &patch.description {
        check_not_blank(&mut list, "description", description.as_deref());
    }
    if patch.issue_date == Some(None) {
        list.add("issueDate", NOT_NULL);
    }
    if patch.manufacturer == Some(None) {
        list.add("manufacturer", NOT_NULL);
    }
    list
}

pub fn validate_manufacturer_input(input: &ManufacturerInput) -> ViolationList {
    let mut list = ViolationList::new();
    check_not_blank(&mut list, "name", input.name.as_deref());
    check_not_blank(&mut list, "description", input.description.as_deref());
    check_country_code(&mut list, input.country_code.as_deref());
    if input.listed_date.is_none() {
        list.add("listedDate", NOT_NULL);
    }
    list
}

pub fn validate_manufacturer_patch(patch: &ManufacturerPatch) -> ViolationList {
    let mut list = ViolationList::new();
    if let Some(name) = &patch.name {
        check_not_blank(&mut list, "name", name.as_deref());
    }
    if let Some(description) = &patch.description {
        check_not_blank(&mut list, "description", description.as_deref());
    }
    if let Some(country_code) = &patch.country_code {
        check_country_code(&mut list, country_code.as_deref());
    }
    if patch.listed_date == Some(None) {
        list.add("listedDate", NOT_NULL);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_product_input() -> ProductInput {
        ProductInput {
            mpn: Some("1234".into()),
            name: Some("A Test Product".into()),
            description: Some("A Test Description".into()),
            issue_date: Some("1985-07-31".into()),
            manufacturer: Some(json!("/api/manufacturers/1")),
        }
    }

    #[test]
    fn valid_product_input_has_no_violations() {
        assert!(validate_product_input(&full_product_input()).is_empty());
    }

    #[test]
    fn empty_mpn_string_is_permitted() {
        let mut input = full_product_input();
        input.mpn = Some(String::new());
        assert!(validate_product_input(&input).is_empty());
    }

    #[test]
    fn all_violations_are_collected_in_field_order() {
        let list = validate_product_input(&ProductInput::default());
        let fields: Vec<&str> = list.0.iter().map(|v| v.property_path).collect();
        assert_eq!(
            fields,
            vec!["mpn", "name", "description", "issueDate", "manufacturer"]
        );
    }

    #[test]
    fn null_manufacturer_yields_exactly_the_not_null_violation() {
        let mut input = full_product_input();
        input.manufacturer = Some(json!(null));
        let list = validate_product_input(&input);
        assert_eq!(list.description(), "manufacturer: This value should not be null.");
    }

    #[test]
    fn malformed_manufacturer_reference_counts_as_null() {
        let mut input = full_product_input();
        input.manufacturer = Some(json!("/api/manufacturers/not-a-number"));
        let list = validate_product_input(&input);
        assert_eq!(list.description(), "manufacturer: This value should not be null.");
    }

    #[test]
    fn whitespace_only_name_is_blank() {
        let mut input = full_product_input();
        input.name = Some("   ".into());
        let list = validate_product_input(&input);
        assert_eq!(list.description(), "name: This value should not be blank.");
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let patch = ProductPatch {
            description: Some(Some("An updated description".into())),
            ..Default::default()
        };
        assert!(validate_product_patch(&patch).is_empty());
    }

    #[test]
    fn patch_null_fields_violate_their_rules() {
        let patch = ProductPatch {
            mpn: Some(None),
            name: Some(None),
            issue_date: Some(None),
            manufacturer: Some(None),
            ..Default::default()
        };
        let list = validate_product_patch(&patch);
        let fields: Vec<&str> = list.0.iter().map(|v| v.property_path).collect();
        assert_eq!(fields, vec!["mpn", "name", "issueDate", "manufacturer"]);
    }

    #[test]
    fn manufacturer_country_code_length_is_capped() {
        let input = ManufacturerInput {
            name: Some("Acme Tooling".into()),
            description: Some("Precision tooling".into()),
            country_code: Some("DEUX".into()),
            listed_date: Some("2021-01-01".into()),
        };
        let list = validate_manufacturer_input(&input);
        assert_eq!(
            list.description(),
            "countryCode: This value is too long. It should have 3 characters or less."
        );
    }

    #[test]
    fn missing_manufacturer_fields_are_all_reported() {
        let list = validate_manufacturer_input(&ManufacturerInput::default());
        let fields: Vec<&str> = list.0.iter().map(|v| v.property_path).collect();
        assert_eq!(fields, vec!["name", "description", "countryCode", "listedDate"]);
    }
}
