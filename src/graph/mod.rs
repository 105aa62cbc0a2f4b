//! Graph abstraction layer for backend-agnostic database access.
//!
//! Repositories talk to the store exclusively through the traits here, so
//! the Neo4j backend can be swapped for another Cypher engine without
//! touching handler code.
//!
//! # Architecture
//!
//! - [`CypherExecutor`] - Execute Cypher queries (required for all graph backends)
//! - [`Transaction`] - Transaction lifecycle (commit/rollback)
//! - [`GraphClient`] - Connection management and transaction creation
//! - [`Graph`] - Scoped sessions with a per-call deadline
//!
//! # Usage
//!
//! ```ignore
//! use hnetdb::graph::{AccessMode, Graph, QueryExt, Transaction};
//!
//! let graph = Graph::new(client, Duration::from_secs(10));
//!
//! let rows = graph
//!     .with_deadline(async {
//!         let txn = graph.session(AccessMode::Read).await?;
//!         let rows = txn
//!             .query("MATCH (n:Node) RETURN n.name AS name")
//!             .fetch_all()
//!             .await?;
//!         txn.commit().await?;
//!         Ok(rows)
//!     })
//!     .await?;
//! ```

mod macros;
mod query;
mod row;
mod traits;

pub mod backends;

pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::{AccessMode, CypherExecutor, GraphClient, Transaction};

#[doc(inline)]
pub use crate::cypher;

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// High-level wrapper around a [`GraphClient`].
///
/// `Graph` adds the two pieces of discipline every repository call follows:
/// a transaction scoped to the call ([`session`](Graph::session)) and a
/// deadline covering the whole call ([`with_deadline`](Graph::with_deadline)).
pub struct Graph<C: GraphClient> {
    client: C,
    deadline: Duration,
}

impl<C: GraphClient> Graph<C> {
    /// Creates a new graph wrapper around the given client.
    pub fn new(client: C, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// Opens a transaction scoped to one repository call.
    ///
    /// The returned transaction is a guard: dropping it without `commit()`
    /// rolls back, which covers `?` returns and expired deadlines.
    pub async fn session(&self, mode: AccessMode) -> Result<C::Tx<'_>, AppError> {
        self.client.begin(mode).await
    }

    /// Runs `fut` with the configured deadline.
    ///
    /// On expiry the future is dropped, which releases any session it holds,
    /// and [`AppError::Timeout`] is returned. Nothing is retried.
    pub async fn with_deadline<R, Fut>(&self, fut: Fut) -> Result<R, AppError>
    where
        Fut: Future<Output = Result<R, AppError>>,
    {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "graph call exceeded its deadline");
                Err(AppError::Timeout(self.deadline))
            }
        }
    }
}
