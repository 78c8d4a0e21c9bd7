//! Session repository
//!
//! Reads and writes the authentication state as three independent storage
//! keys. There is no atomicity across the keys; login and logout are the only
//! writers and always touch all three.

use crate::storage::{KeyValueStore, ROLE_KEY, TOKEN_KEY, USERNAME_KEY};
use async_trait::async_trait;
use sgp_core::{PortalResult, Role, Session};
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Read the current session. Missing fields come back as `None`.
    async fn read(&self) -> PortalResult<Session>;

    /// Replace the stored session; `None` fields are removed
    async fn write(&self, session: &Session) -> PortalResult<()>;

    /// Remove all three session fields
    async fn clear(&self) -> PortalResult<()>;

    /// Read only the token
    async fn token(&self) -> PortalResult<Option<String>> {
        Ok(self.read().await?.token)
    }
}

/// [`SessionRepository`] over any [`KeyValueStore`]
#[derive(Clone)]
pub struct StoredSessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoredSessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    async fn put(&self, key: &str, value: Option<&str>) -> PortalResult<()> {
        match value {
            Some(value) => self.store.set(key, value).await,
            None => self.store.remove(key).await,
        }
    }
}

#[async_trait]
impl SessionRepository for StoredSessionRepository {
    async fn read(&self) -> PortalResult<Session> {
        Ok(Session {
            token: self.store.get(TOKEN_KEY).await?,
            username: self.store.get(USERNAME_KEY).await?,
            role: self.store.get(ROLE_KEY).await?.map(|raw| Role::parse(&raw)),
        })
    }

    async fn write(&self, session: &Session) -> PortalResult<()> {
        self.put(TOKEN_KEY, session.token.as_deref()).await?;
        self.put(USERNAME_KEY, session.username.as_deref()).await?;
        self.put(ROLE_KEY, session.role.as_ref().map(Role::as_str))
            .await?;
        debug!(username = ?session.username, "Session written");
        Ok(())
    }

    async fn clear(&self) -> PortalResult<()> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USERNAME_KEY).await?;
        self.store.remove(ROLE_KEY).await?;
        debug!("Session cleared");
        Ok(())
    }

    async fn token(&self) -> PortalResult<Option<String>> {
        self.store.get(TOKEN_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SIDEBAR_COLLAPSED_KEY};

    fn repository_with(store: &MemoryStore) -> StoredSessionRepository {
        StoredSessionRepository::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_read_missing_fields_as_none() {
        let store = MemoryStore::with_entries([(USERNAME_KEY, "ana")]);
        let repo = repository_with(&store);

        let session = repo.read().await.unwrap();
        assert_eq!(session.token, None);
        assert_eq!(session.username.as_deref(), Some("ana"));
        assert_eq!(session.role, None);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let store = MemoryStore::new();
        let repo = repository_with(&store);

        let session = Session::new("t1", "bo", Role::Admin);
        repo.write(&session).await.unwrap();

        assert_eq!(repo.read().await.unwrap(), session);
        assert_eq!(repo.token().await.unwrap().as_deref(), Some("t1"));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.get(ROLE_KEY).map(String::as_str), Some("admin"));
    }

    #[tokio::test]
    async fn test_write_removes_absent_fields() {
        let store = MemoryStore::new();
        let repo = repository_with(&store);

        repo.write(&Session::new("t1", "bo", Role::Admin))
            .await
            .unwrap();
        repo.write(&Session {
            token: Some("t2".to_string()),
            username: None,
            role: None,
        })
        .await
        .unwrap();

        let session = repo.read().await.unwrap();
        assert_eq!(session.token.as_deref(), Some("t2"));
        assert_eq!(session.username, None);
        assert_eq!(session.role, None);
    }

    #[tokio::test]
    async fn test_unknown_role_is_preserved() {
        let store = MemoryStore::with_entries([(TOKEN_KEY, "t1"), (ROLE_KEY, "auditor")]);
        let repo = repository_with(&store);

        let session = repo.read().await.unwrap();
        assert_eq!(session.role, Some(Role::Unknown("auditor".to_string())));
    }

    #[tokio::test]
    async fn test_clear_leaves_unrelated_keys() {
        let store = MemoryStore::with_entries([
            (TOKEN_KEY, "t1"),
            (USERNAME_KEY, "ana"),
            (ROLE_KEY, "operator"),
            (SIDEBAR_COLLAPSED_KEY, "true"),
        ]);
        let repo = repository_with(&store);

        repo.clear().await.unwrap();
        repo.clear().await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key(SIDEBAR_COLLAPSED_KEY));
        assert_eq!(repo.read().await.unwrap(), Session::anonymous());
    }
}
