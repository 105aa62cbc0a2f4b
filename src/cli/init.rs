//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::graph::backends::neo4j::Neo4jClient;

use super::App;

impl App {
    /// Create the uniqueness constraints the duplicate policy relies on.
    pub async fn run_init(&self) -> Result<()> {
        let config = Config::load()?;

        tracing::info!("Connecting to Neo4j at {}", config.neo4j.uri);
        let client = Neo4jClient::connect(
            &config.neo4j.uri,
            &config.neo4j.username,
            &config.neo4j.password,
            config.neo4j.max_connections,
        )
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect: {}", e))?;

        tracing::info!("Ensuring constraints...");
        client
            .ensure_constraints()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create constraints: {}", e))?;

        tracing::info!("Constraints in place");
        Ok(())
    }
}
