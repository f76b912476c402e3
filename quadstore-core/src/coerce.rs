//! Coercion of raw values into terms
//!
//! Ingestion collaborators may hand the store plain Rust values instead of
//! terms. This module holds the single table that turns them into literals:
//!
//! | Raw value | Term |
//! |---|---|
//! | text | plain literal |
//! | numeric lexical containing `e`/`E` | `xsd:float` literal |
//! | numeric lexical containing `.` | `xsd:decimal` literal |
//! | other numeric lexical | `xsd:integer` literal |
//! | boolean | `xsd:boolean` literal |
//! | date/time | `xsd:dateTime` literal (ISO 8601, UTC) |
//! | list | collection of coerced elements |
//!
//! Whole floats below `1e21` are written without a fraction, so `2.0` becomes
//! the integer `"2"`. Other floats use Rust's shortest round-trip rendering:
//! `1.5` is the decimal `"1.5"` and `1e21` is the float `"1e21"`.

use crate::term::Term;
use chrono::{DateTime, SecondsFormat, Utc};
use quadstore_vocab::xsd;

/// A raw value accepted wherever the store expects a term
#[derive(Clone, Debug)]
pub enum Value {
    /// Already a term; passed through untouched
    Term(Term),
    /// Text (becomes a plain literal)
    Text(String),
    /// Integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Number given in lexical form
    Numeric(String),
    /// Boolean
    Boolean(bool),
    /// Point in time
    DateTime(DateTime<Utc>),
    /// Ordered list
    List(Vec<Value>),
}

/// Datatype for a numeric lexical form
pub fn numeric_datatype(lexical: &str) -> &'static str {
    if lexical.contains(['e', 'E']) {
        xsd::FLOAT
    } else if lexical.contains('.') {
        xsd::DECIMAL
    } else {
        xsd::INTEGER
    }
}

/// Literal for a numeric lexical form
pub fn numeric_literal(lexical: &str) -> Term {
    Term::typed_literal(lexical, numeric_datatype(lexical))
}

fn float_literal(value: f64) -> Term {
    if value.is_nan() {
        Term::typed_literal("NaN", xsd::FLOAT)
    } else if value.is_infinite() {
        let lexical = if value.is_sign_positive() { "INF" } else { "-INF" };
        Term::typed_literal(lexical, xsd::FLOAT)
    } else if value == 0.0 {
        numeric_literal("0")
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        numeric_literal(&format!("{}", value))
    } else {
        numeric_literal(&format!("{:?}", value))
    }
}

/// Literal for a point in time
pub fn date_time_literal(value: &DateTime<Utc>) -> Term {
    Term::typed_literal(
        value.to_rfc3339_opts(SecondsFormat::Secs, true),
        xsd::DATE_TIME,
    )
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        match value {
            Value::Term(term) => term,
            Value::Text(text) => Term::literal(text),
            Value::Integer(i) => Term::typed_literal(i.to_string(), xsd::INTEGER),
            Value::Float(f) => float_literal(f),
            Value::Numeric(lexical) => numeric_literal(&lexical),
            Value::Boolean(b) => Term::typed_literal(b.to_string(), xsd::BOOLEAN),
            Value::DateTime(dt) => date_time_literal(&dt),
            Value::List(items) => Term::collection(items.into_iter().map(Term::from)),
        }
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        Value::Term(term)
    }
}

impl From<&Term> for Value {
    fn from(term: &Term) -> Self {
        Value::Term(term.clone())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn datatype_of(term: &Term) -> Option<&str> {
        term.as_literal().and_then(|lit| lit.datatype())
    }

    #[test]
    fn test_text_is_plain_literal() {
        let term = Term::from(Value::from("hello"));
        assert_eq!(term, Term::literal("hello"));
    }

    #[test]
    fn test_numeric_lexical_table() {
        assert_eq!(numeric_datatype("1e5"), xsd::FLOAT);
        assert_eq!(numeric_datatype("1.5E3"), xsd::FLOAT);
        assert_eq!(numeric_datatype("1.5"), xsd::DECIMAL);
        assert_eq!(numeric_datatype("-42"), xsd::INTEGER);
        assert_eq!(
            Term::from(Value::Numeric("3.25".into())),
            Term::typed_literal("3.25", xsd::DECIMAL)
        );
    }

    #[test]
    fn test_numbers() {
        let int = Term::from(Value::from(42i64));
        assert_eq!(int.as_literal().unwrap().value(), "42");
        assert_eq!(datatype_of(&int), Some(xsd::INTEGER));

        let dec = Term::from(Value::from(1.5));
        assert_eq!(dec.as_literal().unwrap().value(), "1.5");
        assert_eq!(datatype_of(&dec), Some(xsd::DECIMAL));

        let float = Term::from(Value::from(1e21));
        assert_eq!(float.as_literal().unwrap().value(), "1e21");
        assert_eq!(datatype_of(&float), Some(xsd::FLOAT));

        let inf = Term::from(Value::from(f64::INFINITY));
        assert_eq!(inf.as_literal().unwrap().value(), "INF");
        assert_eq!(datatype_of(&inf), Some(xsd::FLOAT));
    }

    #[test]
    fn test_whole_floats_are_integers() {
        assert_eq!(Term::from(Value::from(2.0)), Term::typed_literal("2", xsd::INTEGER));
        assert_eq!(Term::from(Value::from(-0.0)), Term::typed_literal("0", xsd::INTEGER));
        assert_eq!(
            Term::from(Value::from(1e20)),
            Term::typed_literal("100000000000000000000", xsd::INTEGER)
        );
        assert_eq!(Term::from(Value::from(-3.0)), Term::from(Value::from(-3i64)));
    }

    #[test]
    fn test_boolean() {
        let term = Term::from(Value::from(true));
        assert_eq!(term, Term::typed_literal("true", xsd::BOOLEAN));
    }

    #[test]
    fn test_date_time_is_utc_iso8601() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let term = Term::from(Value::from(dt));
        assert_eq!(
            term,
            Term::typed_literal("2021-03-04T05:06:07Z", xsd::DATE_TIME)
        );
    }

    #[test]
    fn test_list_becomes_collection() {
        let term = Term::from(Value::from(vec![1i64, 2, 3]));
        let items = term.as_collection().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], Term::typed_literal("3", xsd::INTEGER));
    }

    #[test]
    fn test_terms_pass_through() {
        let alice = Term::named("http://example.org/alice");
        assert_eq!(Term::from(Value::from(&alice)), alice);
    }
}
