//! Row types
//!
//! Rows are opaque JSON objects owned by the remote database.

use serde_json::{Map, Value};

/// A single table row as returned by the REST endpoint
pub type Row = Map<String, Value>;

/// Outcome of a PATCH or DELETE
///
/// The endpoint answers 200 with the affected rows when it was asked for a
/// representation, or 204 with an empty body otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Affected rows echoed back by the server
    Rows(Vec<Row>),
    /// Applied, server returned no body
    Applied,
}

impl MutationOutcome {
    /// Number of affected rows, if the server reported them
    pub fn affected(&self) -> Option<usize> {
        match self {
            MutationOutcome::Rows(rows) => Some(rows.len()),
            MutationOutcome::Applied => None,
        }
    }

    /// Affected rows, empty when the server returned no body
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            MutationOutcome::Rows(rows) => rows,
            MutationOutcome::Applied => Vec::new(),
        }
    }
}

/// Convert a JSON value into a list of rows.
///
/// Accepts a single object or an array of objects.
pub fn rows_from_value(value: Value) -> crate::Result<Vec<Row>> {
    match value {
        Value::Object(map) => Ok(vec![map]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(crate::RestError::Decode(format!(
                    "element {} is not an object: {}",
                    i, other
                ))),
            })
            .collect(),
        other => Err(crate::RestError::Decode(format!(
            "expected an object or an array of objects, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_single_object() {
        let rows = rows_from_value(json!({"nome": "Mario"})).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["nome"], "Mario");
    }

    #[test]
    fn test_rows_from_array() {
        let rows = rows_from_value(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_rows_from_array_with_scalar_fails() {
        let err = rows_from_value(json!([{"id": 1}, 2])).unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_rows_from_scalar_fails() {
        assert!(rows_from_value(json!("text")).is_err());
    }

    #[test]
    fn test_mutation_outcome_affected() {
        let outcome = MutationOutcome::Rows(vec![Row::new(), Row::new()]);
        assert_eq!(outcome.affected(), Some(2));
        assert_eq!(MutationOutcome::Applied.affected(), None);
        assert!(MutationOutcome::Applied.into_rows().is_empty());
    }
}
