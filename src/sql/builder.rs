//! Builds parameterized SELECT, COUNT, and UPDATE statements for the
//! catalog tables. Filters, ordering, and pagination all resolve to bound
//! parameters or code-owned literals; request input never reaches the SQL
//! text itself.

use chrono::{DateTime, Utc};

use crate::page::Page;
use crate::sql::params::BindValue;

const PRODUCT_COLUMNS: &str = "p.id, p.mpn, p.name, p.description, p.issue_date, p.manufacturer_id";
const MANUFACTURER_COLUMNS: &str = "id, name, description, country_code, listed_date";

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Register a parameter and return its placeholder, cast included.
    fn push(&mut self, value: BindValue) -> String {
        let n = self.params.len() + 1;
        let cast = value.cast();
        self.params.push(value);
        format!("${n}{cast}")
    }
}

/// Product list filters; all present filters combine with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring on product name.
    pub name: Option<String>,
    /// Case-insensitive substring on product description.
    pub description: Option<String>,
    /// Exact match on the owning manufacturer's country code.
    pub country_code: Option<String>,
    /// Exact match on the owning manufacturer's id.
    pub manufacturer_id: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProductOrder {
    /// Insertion order; the default when the client specifies nothing.
    #[default]
    Id,
    IssueDateAsc,
    IssueDateDesc,
}

impl ProductOrder {
    fn clause(self) -> &'static str {
        match self {
            ProductOrder::Id => " ORDER BY p.id",
            ProductOrder::IssueDateAsc => " ORDER BY p.issue_date ASC, p.id",
            ProductOrder::IssueDateDesc => " ORDER BY p.issue_date DESC, p.id",
        }
    }
}

/// Escape LIKE wildcards in user input; backslash is the default escape
/// character in PostgreSQL LIKE/ILIKE.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// FROM/JOIN/WHERE shared by the list and count queries. The manufacturer
/// join only appears when a manufacturer-side filter needs it.
fn product_from_where(filter: &ProductFilter, q: &mut QueryBuf) -> String {
    let mut clause = String::from(" FROM product p");
    if filter.country_code.is_some() {
        clause.push_str(" JOIN manufacturer m ON m.id = p.manufacturer_id");
    }
    let mut wheres = Vec::new();
    if let Some(name) = &filter.name {
        let ph = q.push(BindValue::Text(format!("%{}%", escape_like(name))));
        wheres.push(format!("p.name ILIKE {ph}"));
    }
    if let Some(description) = &filter.description {
        let ph = q.push(BindValue::Text(format!("%{}%", escape_like(description))));
        wheres.push(format!("p.description ILIKE {ph}"));
    }
    if let Some(country_code) = &filter.country_code {
        let ph = q.push(BindValue::Text(country_code.clone()));
        wheres.push(format!("m.country_code = {ph}"));
    }
    if let Some(manufacturer_id) = filter.manufacturer_id {
        let ph = q.push(BindValue::Int(manufacturer_id as i64));
        wheres.push(format!("p.manufacturer_id = {ph}"));
    }
    if !wheres.is_empty() {
        clause.push_str(" WHERE ");
        clause.push_str(&wheres.join(" AND "));
    }
    clause
}

/// One page of the filtered, ordered product listing.
pub fn select_products(filter: &ProductFilter, order: ProductOrder, page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    let from_where = product_from_where(filter, &mut q);
    q.sql = format!(
        "SELECT {PRODUCT_COLUMNS}{from_where}{} LIMIT {} OFFSET {}",
        order.clause(),
        page.limit(),
        page.offset()
    );
    q
}

/// Total item count over the same filtered set as `select_products`.
pub fn count_products(filter: &ProductFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let from_where = product_from_where(filter, &mut q);
    q.sql = format!("SELECT COUNT(*){from_where}");
    q
}

/// Validated field changes for a product UPDATE.
#[derive(Clone, Debug, Default)]
pub struct ProductChanges {
    pub mpn: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    pub manufacturer_id: Option<i32>,
}

/// UPDATE with SET entries only for the provided fields, returning the
/// updated row. An empty change set degrades to a plain SELECT so the
/// caller still gets the current row back.
pub fn update_product(id: i32, changes: &ProductChanges) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    if let Some(mpn) = &changes.mpn {
        let ph = q.push(BindValue::Text(mpn.clone()));
        sets.push(format!("mpn = {ph}"));
    }
    if let Some(name) = &changes.name {
        let ph = q.push(BindValue::Text(name.clone()));
        sets.push(format!("name = {ph}"));
    }
    if let Some(description) = &changes.description {
        let ph = q.push(BindValue::Text(description.clone()));
        sets.push(format!("description = {ph}"));
    }
    if let Some(issue_date) = changes.issue_date {
        let ph = q.push(BindValue::Timestamp(issue_date));
        sets.push(format!("issue_date = {ph}"));
    }
    if let Some(manufacturer_id) = changes.manufacturer_id {
        let ph = q.push(BindValue::Int(manufacturer_id as i64));
        sets.push(format!("manufacturer_id = {ph}"));
    }
    let returning = PRODUCT_COLUMNS.replace("p.", "");
    if sets.is_empty() {
        let ph = q.push(BindValue::Int(id as i64));
        q.sql = format!("SELECT {returning} FROM product WHERE id = {ph}");
        return q;
    }
    let ph = q.push(BindValue::Int(id as i64));
    q.sql = format!(
        "UPDATE product SET {} WHERE id = {ph} RETURNING {returning}",
        sets.join(", ")
    );
    q
}

/// One page of manufacturers in insertion order.
pub fn select_manufacturers(page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {MANUFACTURER_COLUMNS} FROM manufacturer ORDER BY id LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );
    q
}

pub fn count_manufacturers() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = "SELECT COUNT(*) FROM manufacturer".into();
    q
}

/// Validated field changes for a manufacturer UPDATE.
#[derive(Clone, Debug, Default)]
pub struct ManufacturerChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub country_code: Option<String>,
    pub listed_date: Option<DateTime<Utc>>,
}

pub fn update_manufacturer(id: i32, changes: &ManufacturerChanges) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    if let Some(name) = &changes.name {
        let ph = q.push(BindValue::Text(name.clone()));
        sets.push(format!("name = {ph}"));
    }
    if let Some(description) = &changes.description {
        let ph = q.push(BindValue::Text(description.clone()));
        sets.push(format!("description = {ph}"));
    }
    if let Some(country_code) = &changes.country_code {
        let ph = q.push(BindValue::Text(country_code.clone()));
        sets.push(format!("country_code = {ph}"));
    }
    if let Some(listed_date) = changes.listed_date {
        let ph = q.push(BindValue::Timestamp(listed_date));
        sets.push(format!("listed_date = {ph}"));
    }
    if sets.is_empty() {
        let ph = q.push(BindValue::Int(id as i64));
        q.sql = format!("SELECT {MANUFACTURER_COLUMNS} FROM manufacturer WHERE id = {ph}");
        return q;
    }
    let ph = q.push(BindValue::Int(id as i64));
    q.sql = format!(
        "UPDATE manufacturer SET {} WHERE id = {ph} RETURNING {MANUFACTURER_COLUMNS}",
        sets.join(", ")
    );
    q
}
