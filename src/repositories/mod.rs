//! Data access layer for graph operations.
//!
//! Each entity kind has a capability trait ([`NodeRepository`],
//! [`UserRepository`]) with a Neo4j-backed implementation and an in-memory
//! one. Handlers only ever see the trait objects.

mod memory;
mod node;
mod user;

use std::sync::Arc;

pub use memory::{InMemoryNodeRepository, InMemoryUserRepository};
pub use node::{Neo4jNodeRepository, NodeRepository};
pub use user::{Neo4jUserRepository, UserRepository};

/// Node repository as shared by request handlers.
pub type SharedNodeRepository = Arc<dyn NodeRepository>;

/// User repository as shared by request handlers.
pub type SharedUserRepository = Arc<dyn UserRepository>;
