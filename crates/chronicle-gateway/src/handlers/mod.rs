//! Request handlers, one module per front-end feature.

pub mod enrich;
pub mod explore;
pub mod infobox;
pub mod search;

use chronicle_core::{GraphValue, Record};

/// A string column as an owned value; `None` when absent, null or not text.
pub(crate) fn text_column(record: &Record, column: &str) -> Option<String> {
    record.get_str(column).map(str::to_string)
}

/// An integer column; `None` when absent, null or not an integer.
pub(crate) fn integer_column(record: &Record, column: &str) -> Option<i64> {
    record
        .get(column)
        .and_then(GraphValue::as_property)
        .and_then(|v| v.as_i64())
}
