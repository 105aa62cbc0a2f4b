//! Node model representing a tracked network host.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// A host or gateway on the network.
///
/// `name` is the unique key. Nodes are created and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub alias: Option<String>,
    #[serde(rename = "gateway", default)]
    pub is_gateway: bool,
    pub platform: String,
    #[serde(rename = "os")]
    pub operating_system: String,
    pub location: String,
}

impl Node {
    /// Rejects records that cannot be stored under a usable key.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("node name must not be empty".into()));
        }
        Ok(())
    }
}

/// An empty alias is the same as no alias.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let alias = Option::<String>::deserialize(deserializer)?;
    Ok(alias.filter(|a| !a.is_empty()))
}
