//! User repository: registration and credential lookup.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cypher;
use crate::error::AppError;
use crate::graph::{AccessMode, Graph, GraphClient, QueryExt, Transaction};
use crate::models::User;
use crate::repositories::node::created;
use crate::security::{verify_decoy, verify_password};

/// Storage operations over [`User`] accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new account exactly as given.
    ///
    /// Fails with [`AppError::Conflict`] if the email is already registered.
    async fn register_user(&self, user: &User) -> Result<(), AppError>;

    /// Returns the account registered under `email`, or [`AppError::NotFound`].
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;

    /// Returns the account whose email and password both match.
    ///
    /// A wrong password is indistinguishable from an unknown email: both
    /// yield [`AppError::NotFound`] after one Argon2 verification.
    async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = match self.find_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound(what)) => {
                verify_decoy(password);
                return Err(AppError::NotFound(what));
            }
            Err(e) => return Err(e),
        };
        if verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(AppError::NotFound(format!("user '{}'", email)))
        }
    }
}

/// [`UserRepository`] backed by a Cypher graph store.
pub struct Neo4jUserRepository<C: GraphClient> {
    graph: Arc<Graph<C>>,
}

impl<C: GraphClient> Neo4jUserRepository<C> {
    pub fn new(graph: Arc<Graph<C>>) -> Self {
        Self { graph }
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let txn = self.graph.session(AccessMode::Write).await?;
        let row = cypher!(
            txn,
            "OPTIONAL MATCH (existing:User {email: $email})
             WITH existing WHERE existing IS NULL
             CREATE (u:User {username: $username, email: $email, password_hash: $password_hash})
             RETURN count(u) AS created",
            username = &user.username,
            email = &user.email,
            password_hash = &user.password_hash,
        )
        .fetch_one()
        .await?;

        if created(row)? == 0 {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        txn.commit().await
    }

    async fn select_by_email(&self, email: &str) -> Result<User, AppError> {
        let txn = self.graph.session(AccessMode::Read).await?;
        let row = cypher!(
            txn,
            "MATCH (u:User {email: $email})
             RETURN u.username AS username, u.email AS email, u.password_hash AS password_hash
             LIMIT 1",
            email = email,
        )
        .fetch_one()
        .await?;
        txn.commit().await?;

        let row = row.ok_or_else(|| AppError::NotFound(format!("user '{}'", email)))?;
        Ok(User {
            username: row.get("username")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
        })
    }
}

#[async_trait]
impl<C> UserRepository for Neo4jUserRepository<C>
where
    C: GraphClient + 'static,
{
    async fn register_user(&self, user: &User) -> Result<(), AppError> {
        self.graph.with_deadline(self.insert(user)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.graph.with_deadline(self.select_by_email(email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::repositories::node::tests::{graph, row, ScriptedClient};
    use crate::security::hash_password;

    fn mig() -> User {
        User {
            username: "mig".into(),
            email: "mig@dearn".into(),
            password_hash: hash_password("s3cr3t").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_only() {
        let client = ScriptedClient {
            rows: vec![row(json!({"created": 1}))],
            ..Default::default()
        };
        let statements = client.statements.clone();
        let repo = Neo4jUserRepository::new(graph(client));
        let user = mig();

        repo.register_user(&user).await.unwrap();

        let statements = statements.lock().unwrap();
        let (_, params) = &statements[0];
        assert_eq!(params["password_hash"], json!(user.password_hash));
        assert!(!params.contains_key("password"));
    }

    #[tokio::test]
    async fn test_register_taken_email_conflicts() {
        let client = ScriptedClient {
            rows: vec![row(json!({"created": 0}))],
            ..Default::default()
        };
        let repo = Neo4jUserRepository::new(graph(client));

        let result = repo.register_user(&mig()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let user = mig();
        let client = ScriptedClient {
            rows: vec![row(json!({
                "username": user.username,
                "email": user.email,
                "password_hash": user.password_hash,
            }))],
            ..Default::default()
        };
        let repo = Neo4jUserRepository::new(graph(client));

        let found = repo
            .find_by_email_and_password("mig@dearn", "s3cr3t")
            .await
            .unwrap();
        assert_eq!(found, user);

        let wrong = repo.find_by_email_and_password("mig@dearn", "guess").await;
        assert!(matches!(wrong, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_email_is_not_found() {
        let repo = Neo4jUserRepository::new(graph(ScriptedClient::default()));

        let result = repo.find_by_email("nobody@dearn").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_hash() {
        let repo = Neo4jUserRepository::new(graph(ScriptedClient::default()));

        let result = repo
            .find_by_email_and_password("nobody@dearn", "s3cr3t")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(crate::security::decoy_used());
    }
}
