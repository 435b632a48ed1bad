//! Bind values for dynamically built queries.
//!
//! Everything is sent as TEXT; the builder appends an SQL cast
//! (`$n::int`, `$n::timestamptz`) wherever the column is not textual, so
//! PostgreSQL converts on its side and the wire encoding stays uniform.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

#[derive(Clone, Debug)]
pub enum BindValue {
    Text(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl BindValue {
    pub fn to_text(&self) -> String {
        match self {
            BindValue::Text(s) => s.clone(),
            BindValue::Int(n) => n.to_string(),
            BindValue::Timestamp(dt) => dt.to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }

    /// Cast suffix the builder appends to this value's placeholder.
    pub fn cast(&self) -> &'static str {
        match self {
            BindValue::Text(_) => "",
            BindValue::Int(_) => "::int",
            BindValue::Timestamp(_) => "::timestamptz",
        }
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let text = self.to_text();
        <String as Encode<Postgres>>::encode_by_ref(&text, buf)
    }
}

impl sqlx::Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn text_forms_are_castable() {
        assert_eq!(BindValue::Int(42).to_text(), "42");
        assert_eq!(BindValue::Text("abc".into()).to_text(), "abc");
        let dt = Utc.with_ymd_and_hms(1985, 7, 31, 0, 0, 0).unwrap();
        assert!(BindValue::Timestamp(dt).to_text().starts_with("1985-07-31T00:00:00"));
    }

    #[test]
    fn casts_match_variants() {
        assert_eq!(BindValue::Text(String::new()).cast(), "");
        assert_eq!(BindValue::Int(1).cast(), "::int");
    }
}
