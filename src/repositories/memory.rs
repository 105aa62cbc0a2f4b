//! In-memory repositories for tests and local development.
//!
//! Same contracts as the graph-backed implementations, insertion order
//! preserved, held behind `tokio::sync::RwLock`.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{Node, User};
use crate::repositories::{NodeRepository, UserRepository};

/// In-memory [`NodeRepository`].
#[derive(Debug, Default)]
pub struct InMemoryNodeRepository {
    nodes: RwLock<Vec<Node>>,
}

impl InMemoryNodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeRepository for InMemoryNodeRepository {
    async fn save(&self, node: &Node) -> Result<(), AppError> {
        let mut nodes = self.nodes.write().await;
        if nodes.iter().any(|n| n.name == node.name) {
            return Err(AppError::Conflict(format!(
                "node '{}' already exists",
                node.name
            )));
        }
        nodes.push(node.clone());
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Node>, AppError> {
        Ok(self.nodes.read().await.clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<Node, AppError> {
        self.nodes
            .read()
            .await
            .iter()
            .find(|n| n.name == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("node '{}'", name)))
    }

    async fn delete_by_name(&self, name: &str) -> Result<(), AppError> {
        self.nodes.write().await.retain(|n| n.name != name);
        Ok(())
    }
}

/// In-memory [`UserRepository`].
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn register_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", email)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::security::hash_password;

    fn node(name: &str) -> Node {
        Node {
            name: name.to_string(),
            alias: Some("DEBRXMVS".to_string()),
            is_gateway: false,
            platform: "Hercules 4 on Linux".to_string(),
            operating_system: "MVS3.8J".to_string(),
            location: "Germany".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_then_find_by_name_roundtrips() {
        let repo = InMemoryNodeRepository::new();
        let saved = node("DRNBRX1A");
        repo.save(&saved).await.unwrap();

        assert_eq!(repo.find_by_name("DRNBRX1A").await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let repo = InMemoryNodeRepository::new();
        repo.save(&node("DRNBRX1A")).await.unwrap();

        let result = repo.save(&node("DRNBRX1A")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryNodeRepository::new();
        repo.save(&node("DRNBRX1A")).await.unwrap();

        repo.delete_by_name("DRNBRX1A").await.unwrap();
        assert!(matches!(
            repo.find_by_name("DRNBRX1A").await,
            Err(AppError::NotFound(_))
        ));

        repo.delete_by_name("DRNBRX1A").await.unwrap();
        assert!(matches!(
            repo.find_by_name("DRNBRX1A").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_returns_every_saved_name() {
        let repo = InMemoryNodeRepository::new();
        assert!(repo.find_all().await.unwrap().is_empty());

        let names = ["DRNBRX1A", "DKAARH1", "UCLAMVS"];
        for name in names {
            repo.save(&node(name)).await.unwrap();
        }

        let found: HashSet<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        let expected: HashSet<String> = names.iter().map(|s| s.to_string()).collect();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let repo = InMemoryUserRepository::new();
        let user = User {
            username: "mig".into(),
            email: "mig@dearn".into(),
            password_hash: hash_password("s3cr3t").unwrap(),
        };
        repo.register_user(&user).await.unwrap();

        let found = repo
            .find_by_email_and_password("mig@dearn", "s3cr3t")
            .await
            .unwrap();
        assert_eq!(found.username, "mig");

        assert!(matches!(
            repo.find_by_email_and_password("mig@dearn", "wrong").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.find_by_email_and_password("nobody@dearn", "s3cr3t").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        let user = User {
            username: "mig".into(),
            email: "mig@dearn".into(),
            password_hash: hash_password("s3cr3t").unwrap(),
        };
        repo.register_user(&user).await.unwrap();
        assert!(matches!(
            repo.register_user(&user).await,
            Err(AppError::Conflict(_))
        ));
    }
}
