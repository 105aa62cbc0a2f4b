//! Node repository: one Cypher statement per operation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cypher;
use crate::error::AppError;
use crate::graph::{AccessMode, Graph, GraphClient, QueryExt, Row, Transaction};
use crate::models::Node;

/// Projection shared by every read, aliased to the wire field names.
const NODE_COLUMNS: &str = "n.name AS name, n.alias AS alias, n.gateway AS gateway, \
                            n.platform AS platform, n.os AS os, n.location AS location";

/// Storage operations over [`Node`] records.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Persists a new node.
    ///
    /// Fails with [`AppError::Conflict`] if a node with the same name exists.
    async fn save(&self, node: &Node) -> Result<(), AppError>;

    /// Returns every stored node. An empty store yields an empty vector.
    async fn find_all(&self) -> Result<Vec<Node>, AppError>;

    /// Returns the node called `name`, or [`AppError::NotFound`].
    async fn find_by_name(&self, name: &str) -> Result<Node, AppError>;

    /// Deletes every node called `name`. Succeeds when nothing matched.
    async fn delete_by_name(&self, name: &str) -> Result<(), AppError>;
}

/// [`NodeRepository`] backed by a Cypher graph store.
///
/// Every call runs inside its own transaction under the graph's deadline.
pub struct Neo4jNodeRepository<C: GraphClient> {
    graph: Arc<Graph<C>>,
}

impl<C: GraphClient> Clone for Neo4jNodeRepository<C> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
        }
    }
}

impl<C: GraphClient> Neo4jNodeRepository<C> {
    pub fn new(graph: Arc<Graph<C>>) -> Self {
        Self { graph }
    }

    async fn insert(&self, node: &Node) -> Result<(), AppError> {
        let txn = self.graph.session(AccessMode::Write).await?;
        let row = cypher!(
            txn,
            "OPTIONAL MATCH (existing:Node {name: $name})
             WITH existing WHERE existing IS NULL
             CREATE (n:Node {
                 name: $name,
                 alias: $alias,
                 gateway: $gateway,
                 platform: $platform,
                 os: $os,
                 location: $location
             })
             RETURN count(n) AS created",
            name = &node.name,
            alias = &node.alias,
            gateway = node.is_gateway,
            platform = &node.platform,
            os = &node.operating_system,
            location = &node.location,
        )
        .fetch_one()
        .await?;

        if created(row)? == 0 {
            tracing::warn!(name = %node.name, "rejecting duplicate node");
            return Err(AppError::Conflict(format!(
                "node '{}' already exists",
                node.name
            )));
        }

        txn.commit().await
    }

    async fn select_all(&self) -> Result<Vec<Node>, AppError> {
        let txn = self.graph.session(AccessMode::Read).await?;
        let rows = txn
            .query(&format!(
                "MATCH (n:Node) RETURN {} ORDER BY n.name",
                NODE_COLUMNS
            ))
            .fetch_all()
            .await?;
        txn.commit().await?;

        rows.iter().map(Row::to::<Node>).collect()
    }

    async fn select_by_name(&self, name: &str) -> Result<Node, AppError> {
        let txn = self.graph.session(AccessMode::Read).await?;
        let row = cypher!(
            txn,
            &format!(
                "MATCH (n:Node {{name: $name}}) RETURN {} LIMIT 1",
                NODE_COLUMNS
            ),
            name = name,
        )
        .fetch_one()
        .await?;
        txn.commit().await?;

        match row {
            Some(row) => row.to::<Node>(),
            None => Err(AppError::NotFound(format!("node '{}'", name))),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        let txn = self.graph.session(AccessMode::Write).await?;
        cypher!(
            txn,
            "MATCH (n:Node {name: $name}) DETACH DELETE n",
            name = name
        )
        .run()
        .await?;
        txn.commit().await
    }
}

/// Reads the `created` counter returned by a guarded `CREATE`.
pub(crate) fn created(row: Option<Row>) -> Result<i64, AppError> {
    match row {
        Some(row) => row.get("created"),
        None => Ok(0),
    }
}

#[async_trait]
impl<C> NodeRepository for Neo4jNodeRepository<C>
where
    C: GraphClient + 'static,
{
    async fn save(&self, node: &Node) -> Result<(), AppError> {
        self.graph.with_deadline(self.insert(node)).await
    }

    async fn find_all(&self) -> Result<Vec<Node>, AppError> {
        self.graph.with_deadline(self.select_all()).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Node, AppError> {
        self.graph.with_deadline(self.select_by_name(name)).await
    }

    async fn delete_by_name(&self, name: &str) -> Result<(), AppError> {
        tracing::debug!(name, "deleting node");
        self.graph.with_deadline(self.delete(name)).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use crate::graph::{CypherExecutor, Params, RowStream};

    /// Client that answers every read with a fixed set of rows and records
    /// each statement it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        pub rows: Vec<Row>,
        pub statements: Arc<Mutex<Vec<(String, Params)>>>,
        pub commits: Arc<Mutex<usize>>,
    }

    pub(crate) struct ScriptedTx {
        rows: Vec<Row>,
        statements: Arc<Mutex<Vec<(String, Params)>>>,
        commits: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl CypherExecutor for ScriptedClient {
        async fn execute_cypher(&self, _: &str, _: Params) -> Result<RowStream<'_>, AppError> {
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn run_cypher(&self, _: &str, _: Params) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CypherExecutor for ScriptedTx {
        async fn execute_cypher(
            &self,
            cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            self.statements
                .lock()
                .unwrap()
                .push((cypher.to_string(), params));
            Ok(Box::pin(futures::stream::iter(
                self.rows.clone().into_iter().map(Ok),
            )))
        }

        async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
            self.statements
                .lock()
                .unwrap()
                .push((cypher.to_string(), params));
            Ok(())
        }
    }

    #[async_trait]
    impl Transaction for ScriptedTx {
        async fn commit(self) -> Result<(), AppError> {
            *self.commits.lock().unwrap() += 1;
            Ok(())
        }

        async fn rollback(self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[async_trait]
    impl GraphClient for ScriptedClient {
        type Tx<'a> = ScriptedTx;

        async fn begin(&self, _mode: AccessMode) -> Result<Self::Tx<'_>, AppError> {
            Ok(ScriptedTx {
                rows: self.rows.clone(),
                statements: self.statements.clone(),
                commits: self.commits.clone(),
            })
        }
    }

    pub(crate) fn graph(client: ScriptedClient) -> Arc<Graph<ScriptedClient>> {
        Arc::new(Graph::new(client, Duration::from_secs(1)))
    }

    pub(crate) fn row(value: serde_json::Value) -> Row {
        Row::new(serde_json::from_value(value).unwrap())
    }

    fn drnbrx1a() -> Node {
        Node {
            name: "DRNBRX1A".into(),
            alias: None,
            is_gateway: false,
            platform: "Hercules 4 on Linux".into(),
            operating_system: "MVS3.8J".into(),
            location: "Germany".into(),
        }
    }

    #[tokio::test]
    async fn test_save_binds_wire_properties() {
        let client = ScriptedClient {
            rows: vec![row(json!({"created": 1}))],
            ..Default::default()
        };
        let statements = client.statements.clone();
        let commits = client.commits.clone();
        let repo = Neo4jNodeRepository::new(graph(client));

        repo.save(&drnbrx1a()).await.unwrap();

        let statements = statements.lock().unwrap();
        let (_, params) = &statements[0];
        assert_eq!(params["name"], json!("DRNBRX1A"));
        assert_eq!(params["gateway"], json!(false));
        assert_eq!(params["os"], json!("MVS3.8J"));
        assert_eq!(params["alias"], json!(null));
        assert_eq!(*commits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_existing_name_conflicts_without_commit() {
        let client = ScriptedClient {
            rows: vec![row(json!({"created": 0}))],
            ..Default::default()
        };
        let commits = client.commits.clone();
        let repo = Neo4jNodeRepository::new(graph(client));

        let result = repo.save(&drnbrx1a()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(*commits.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_all_decodes_rows() {
        let client = ScriptedClient {
            rows: vec![
                row(json!({
                    "name": "DKAARH1", "alias": "AARHUS", "gateway": true,
                    "platform": "IBM 3081", "os": "VM/SP", "location": "Denmark"
                })),
                row(json!({
                    "name": "DRNBRX1A", "alias": null, "gateway": false,
                    "platform": "Hercules 4 on Linux", "os": "MVS3.8J", "location": "Germany"
                })),
            ],
            ..Default::default()
        };
        let repo = Neo4jNodeRepository::new(graph(client));

        let nodes = repo.find_all().await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].alias.as_deref(), Some("AARHUS"));
        assert!(nodes[0].is_gateway);
        assert_eq!(nodes[1], drnbrx1a());
    }

    #[tokio::test]
    async fn test_find_by_name_missing_is_not_found() {
        let repo = Neo4jNodeRepository::new(graph(ScriptedClient::default()));

        let result = repo.find_by_name("NOSUCH").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_detaches_by_name() {
        let client = ScriptedClient::default();
        let statements = client.statements.clone();
        let repo = Neo4jNodeRepository::new(graph(client));

        repo.delete_by_name("DRNBRX1A").await.unwrap();

        let statements = statements.lock().unwrap();
        assert!(statements[0].0.contains("DETACH DELETE"));
        assert_eq!(statements[0].1["name"], json!("DRNBRX1A"));
    }
}
