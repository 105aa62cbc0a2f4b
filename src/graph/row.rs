//! Row and streaming types for query results.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries.
///
/// A map of parameter names to JSON values that can be passed to queries.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result.
///
/// Contains column values as JSON, with typed extraction via [`Row::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or if deserialization fails.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    AppError::Internal(format!("failed to deserialize '{}': {}", key, e))
                })
            })
    }

    /// Gets a value from the row, returning `None` if the key is missing or null.
    ///
    /// Still returns an error if the key exists but deserialization fails.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Internal(format!("failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Deserializes the whole row, treating columns as struct fields.
    pub fn to<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let object: serde_json::Map<String, JsonValue> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(JsonValue::Object(object))
            .map_err(|e| AppError::Internal(format!("failed to deserialize row: {}", e)))
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn row(pairs: &[(&str, JsonValue)]) -> Row {
        Row::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_row_get_string() {
        let row = row(&[("name", json!("DRNBRX1A"))]);
        let name: String = row.get("name").unwrap();
        assert_eq!(name, "DRNBRX1A");
    }

    #[test]
    fn test_row_get_number() {
        let row = row(&[("count", json!(42))]);
        let count: i64 = row.get("count").unwrap();
        assert_eq!(count, 42);
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = Row::default();
        let result: Result<String, _> = row.get("missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_row_get_opt_null() {
        let row = row(&[("alias", JsonValue::Null)]);
        let alias: Option<String> = row.get_opt("alias").unwrap();
        assert_eq!(alias, None);
        let missing: Option<String> = row.get_opt("other").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_row_to_struct() {
        #[derive(Deserialize)]
        struct Projection {
            name: String,
            gateway: bool,
        }

        let row = row(&[("name", json!("DRNBRX1A")), ("gateway", json!(true))]);
        let projection: Projection = row.to().unwrap();
        assert_eq!(projection.name, "DRNBRX1A");
        assert!(projection.gateway);
    }
}
