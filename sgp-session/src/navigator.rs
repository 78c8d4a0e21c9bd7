//! Navigation of the browsing context
//!
//! A redirect is terminal for the current page lifecycle. The accessor only
//! asks for one; what it means is up to the host.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[async_trait]
pub trait Navigator: Send + Sync {
    /// Send the browsing context to `target`
    async fn redirect(&self, target: &str);
}

/// Navigator that remembers every redirect, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    redirects: Arc<RwLock<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn redirects(&self) -> Vec<String> {
        self.redirects.read().await.clone()
    }

    pub async fn last_redirect(&self) -> Option<String> {
        self.redirects.read().await.last().cloned()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn redirect(&self, target: &str) {
        info!(target_path = %target, "Redirect recorded");
        self.redirects.write().await.push(target.to_string());
    }
}
