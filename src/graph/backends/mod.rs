//! Backend implementations for different graph databases.
//!
//! Each backend implements the core traits from [`crate::graph`]:
//!
//! - [`CypherExecutor`](crate::graph::CypherExecutor) - Required
//! - [`Transaction`](crate::graph::Transaction) - Required
//! - [`GraphClient`](crate::graph::GraphClient) - Required
//!
//! # Available Backends
//!
//! | Backend | Module | Status |
//! |---------|--------|--------|
//! | Neo4j (Bolt) | [`neo4j`] | Available |

pub mod neo4j;
