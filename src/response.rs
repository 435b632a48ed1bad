//! Hydra-style collection envelopes and page-navigation links.

use serde_json::{json, Map, Value};

use crate::page::PageMeta;

/// Percent-encode one query value; unreserved characters pass through.
fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// `/api/products?name=bolt&page=2` — applied filters first (in the order
/// they were recognized), page last, so every navigation link preserves the
/// filtered view it belongs to.
fn page_link(base_path: &str, query: &[(String, String)], page: i64) -> String {
    let mut link = String::from(base_path);
    link.push('?');
    for (key, value) in query {
        link.push_str(&encode_query_value(key));
        link.push('=');
        link.push_str(&encode_query_value(value));
        link.push('&');
    }
    link.push_str(&format!("page={page}"));
    link
}

fn view(base_path: &str, query: &[(String, String)], meta: &PageMeta) -> Value {
    let mut view = Map::new();
    view.insert("@id".into(), json!(page_link(base_path, query, meta.page)));
    view.insert("@type".into(), json!("hydra:PartialCollectionView"));
    view.insert(
        "hydra:first".into(),
        json!(page_link(base_path, query, 1)),
    );
    view.insert(
        "hydra:last".into(),
        json!(page_link(base_path, query, meta.last_page())),
    );
    if meta.has_previous() {
        view.insert(
            "hydra:previous".into(),
            json!(page_link(base_path, query, meta.page - 1)),
        );
    }
    if meta.has_next() {
        view.insert(
            "hydra:next".into(),
            json!(page_link(base_path, query, meta.page + 1)),
        );
    }
    Value::Object(view)
}

/// The collection envelope: `@context` per resource type, members for the
/// requested page, total over the filtered set, and the navigation view.
pub fn collection(
    resource_type: &str,
    base_path: &str,
    members: Vec<Value>,
    meta: &PageMeta,
    query: &[(String, String)],
) -> Value {
    json!({
        "@context": format!("/api/contexts/{resource_type}"),
        "@id": base_path,
        "@type": "hydra:Collection",
        "hydra:totalItems": meta.total_items,
        "hydra:member": members,
        "hydra:view": view(base_path, query, meta),
    })
}
