//! Application context shared by request handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::error::AppError;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::Graph;
use crate::repositories::{
    Neo4jNodeRepository, Neo4jUserRepository, SharedNodeRepository, SharedUserRepository,
};
use crate::security::TokenIssuer;

/// Root application context.
///
/// Built once at startup and cloned into every request. `#[derive(FromRef)]`
/// lets a handler extract just the field it needs, e.g.
/// `State(nodes): State<SharedNodeRepository>`.
#[derive(Clone, FromRef)]
pub struct Context {
    /// Node storage.
    pub nodes: SharedNodeRepository,
    /// User storage.
    pub users: SharedUserRepository,
    /// Login token issuer.
    pub tokens: Arc<TokenIssuer>,
}

impl Context {
    /// Creates a context from already-constructed dependencies.
    pub fn new(
        nodes: SharedNodeRepository,
        users: SharedUserRepository,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            nodes,
            users,
            tokens: Arc::new(tokens),
        }
    }

    /// Connects to Neo4j, ensures the uniqueness constraints exist and wires
    /// the graph-backed repositories.
    ///
    /// The guarded `CREATE` statements only reject concurrent duplicates once
    /// `node_name_unique` and `user_email_unique` are in place.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let tokens = TokenIssuer::new(&config.auth.secret, config.auth.token_ttl())?;

        tracing::info!("Connecting to Neo4j at {}", config.neo4j.uri);
        let client = Neo4jClient::connect(
            &config.neo4j.uri,
            &config.neo4j.username,
            &config.neo4j.password,
            config.neo4j.max_connections,
        )
        .await?;
        tracing::info!("Connected to Neo4j");

        client.ensure_constraints().await?;

        let graph = Arc::new(Graph::new(client, config.neo4j.query_timeout()));

        Ok(Self::new(
            Arc::new(Neo4jNodeRepository::new(graph.clone())),
            Arc::new(Neo4jUserRepository::new(graph)),
            tokens,
        ))
    }
}
