//! Neo4j backend implementation over the Bolt protocol.
//!
//! # Example
//!
//! ```ignore
//! use hnetdb::graph::backends::neo4j::Neo4jClient;
//! use hnetdb::graph::QueryExt;
//!
//! let client = Neo4jClient::connect("bolt://localhost:7687", "neo4j", "secret", 16).await?;
//! let rows = client.query("MATCH (n:Node) RETURN n.name AS name").fetch_all().await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Txn};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::{AccessMode, CypherExecutor, GraphClient, Transaction};

/// Uniqueness constraints backing the duplicate-name and duplicate-email policy.
const CONSTRAINTS: &[&str] = &[
    "CREATE CONSTRAINT node_name_unique IF NOT EXISTS FOR (n:Node) REQUIRE n.name IS UNIQUE",
    "CREATE CONSTRAINT user_email_unique IF NOT EXISTS FOR (u:User) REQUIRE u.email IS UNIQUE",
];

/// Neo4j graph client.
///
/// Wraps `neo4rs::Graph`, which owns the driver's connection pool.
/// Cheap to clone.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: neo4rs::Graph,
}

impl Neo4jClient {
    /// Connects to Neo4j with basic authentication.
    ///
    /// `max_connections` bounds the driver's internal pool; no other pooling
    /// strategy is layered on top.
    pub async fn connect(
        uri: &str,
        user: &str,
        password: &str,
        max_connections: usize,
    ) -> Result<Self, AppError> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .max_connections(max_connections)
            .build()?;

        let graph = neo4rs::Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Creates the uniqueness constraints, skipping ones that already exist.
    pub async fn ensure_constraints(&self) -> Result<(), AppError> {
        for statement in CONSTRAINTS {
            tracing::debug!(statement, "ensuring constraint");
            self.graph
                .run(neo4rs::query(statement))
                .await
                .map_err(|e| query_error(e, statement))?;
        }
        Ok(())
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let graph = self.graph.clone();
        let cypher = cypher.to_string();
        let query = build_query(&cypher, params);

        Ok(Box::pin(async_stream::stream! {
            let mut result = match graph.execute(query).await {
                Ok(result) => result,
                Err(e) => {
                    yield Err(query_error(e, &cypher));
                    return;
                }
            };
            loop {
                match result.next().await {
                    Ok(Some(row)) => yield parse_row(&row),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(query_error(e, &cypher));
                        break;
                    }
                }
            }
        }))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.graph
            .run(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    type Tx<'a> = Neo4jTransaction;

    /// Starts an explicit transaction.
    ///
    /// `mode` is only logged: against a single instance every transaction
    /// goes to the same server, so reads and writes are routed alike.
    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx<'_>, AppError> {
        tracing::debug!(?mode, "beginning transaction");
        let txn = self.graph.start_txn().await?;
        Ok(Neo4jTransaction {
            txn: Mutex::new(Some(txn)),
        })
    }
}

/// An open Neo4j transaction.
///
/// Holds a pooled connection for its lifetime. Dropping it without
/// `commit()` or `rollback()` leaves the server-side transaction open only
/// until the pool recycles the connection, which resets (and so rolls back)
/// any work in flight.
pub struct Neo4jTransaction {
    txn: Mutex<Option<Txn>>,
}

impl Neo4jTransaction {
    fn finished() -> AppError {
        AppError::Internal("transaction already finished".to_string())
    }
}

#[async_trait]
impl CypherExecutor for Neo4jTransaction {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let mut guard = self.txn.lock().await;
        let txn = guard.as_mut().ok_or_else(Self::finished)?;

        let mut stream = txn
            .execute(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next(txn.handle())
            .await
            .map_err(|e| query_error(e, cypher))?
        {
            rows.push(parse_row(&row));
        }

        Ok(Box::pin(futures::stream::iter(rows)))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        let mut guard = self.txn.lock().await;
        let txn = guard.as_mut().ok_or_else(Self::finished)?;
        txn.run(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))
    }
}

#[async_trait]
impl Transaction for Neo4jTransaction {
    async fn commit(mut self) -> Result<(), AppError> {
        let txn = self.txn.get_mut().take().ok_or_else(Self::finished)?;
        txn.commit().await.map_err(|e| query_error(e, "COMMIT"))
    }

    async fn rollback(mut self) -> Result<(), AppError> {
        let txn = self.txn.get_mut().take().ok_or_else(Self::finished)?;
        txn.rollback().await?;
        Ok(())
    }
}

impl Drop for Neo4jTransaction {
    fn drop(&mut self) {
        if self.txn.get_mut().is_some() {
            tracing::debug!("Neo4jTransaction dropped without commit - rolling back");
        }
    }
}

/// Builds a driver query, binding every parameter as a Bolt value.
fn build_query(cypher: &str, params: Params) -> neo4rs::Query {
    params
        .into_iter()
        .fold(neo4rs::query(cypher), |query, (name, value)| {
            query.param(&name, to_bolt(value))
        })
}

/// Converts a JSON parameter into its Bolt equivalent.
fn to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::from(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => BoltType::from(s),
        JsonValue::Array(items) => {
            BoltType::from(items.into_iter().map(to_bolt).collect::<Vec<BoltType>>())
        }
        JsonValue::Object(map) => BoltType::from(
            map.into_iter()
                .map(|(k, v)| (k, to_bolt(v)))
                .collect::<HashMap<String, BoltType>>(),
        ),
    }
}

/// Converts a driver row into a column map.
fn parse_row(row: &neo4rs::Row) -> Result<Row, AppError> {
    row.to::<HashMap<String, JsonValue>>()
        .map(Row::new)
        .map_err(|e| AppError::Internal(format!("failed to decode row: {}", e)))
}

fn query_error(err: neo4rs::Error, cypher: &str) -> AppError {
    let message = err.to_string();
    if message.contains("ConstraintValidationFailed") {
        return AppError::Conflict(message);
    }
    AppError::Query {
        message,
        query: cypher.to_string(),
    }
}
