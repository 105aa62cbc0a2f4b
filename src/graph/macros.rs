//! Macro for convenient Cypher query construction.

/// Macro for inline Cypher queries with optional parameters.
///
/// Parameter names double as the `$name` placeholders in the statement.
///
/// # Usage
///
/// ```ignore
/// use hnetdb::graph::cypher;
///
/// let rows = cypher!(txn, "MATCH (n:Node) RETURN n.name AS name")
///     .fetch_all()
///     .await?;
///
/// cypher!(txn, "MATCH (n:Node {name: $name}) DELETE n", name = node_name)
///     .run()
///     .await?;
/// ```
#[macro_export]
macro_rules! cypher {
    // Query without parameters
    ($graph:expr, $query:expr) => {
        $graph.query($query)
    };
    // Query with parameters
    ($graph:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $graph.query($query)$(.param(stringify!($name), $value))+
    };
}
