//! Core traits for graph database abstraction.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`CypherExecutor`] - Required for all graph backends
//! - [`Transaction`] - Transaction lifecycle management
//! - [`GraphClient`] - Connection pool and transaction creation

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
///
/// This is the core trait that all graph backends must implement.
/// It provides methods for executing queries that return results
/// and queries that don't (mutations).
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN).
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET).
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;
}

/// Transaction lifecycle management.
///
/// A transaction that is dropped before [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) is rolled back by the backend, so
/// early returns and cancelled futures never leave partial writes behind.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    ///
    /// Consumes the transaction - it cannot be used after commit.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    ///
    /// Consumes the transaction - it cannot be used after rollback.
    async fn rollback(self) -> Result<(), AppError>;
}

/// Access mode requested when a transaction begins.
///
/// Backends that route reads to followers use it to pick a server;
/// single-instance backends may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// A graph database client that can begin transactions.
///
/// This trait extends [`CypherExecutor`] to add transaction support.
/// Implementations typically wrap a connection pool and provide
/// auto-commit queries via the executor methods, plus explicit
/// transactions via [`begin`](GraphClient::begin).
#[async_trait]
pub trait GraphClient: CypherExecutor {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + CypherExecutor
    where
        Self: 'a;

    /// Begins a new transaction.
    ///
    /// The returned transaction can be used to execute queries,
    /// then must be either committed or rolled back.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let txn = client.begin(AccessMode::Write).await?;
    /// txn.run_cypher("CREATE (n:Node {name: $name})", params).await?;
    /// txn.commit().await?;
    /// ```
    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx<'_>, AppError>;
}
