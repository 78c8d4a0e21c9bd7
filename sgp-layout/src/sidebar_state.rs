//! Persisted sidebar collapse state

use crate::surface::LayoutSurface;
use sgp_core::{ErrorContext, PortalError, PortalResult, SidebarState};
use sgp_session::{KeyValueStore, SIDEBAR_COLLAPSED_KEY};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct SidebarStateStore {
    store: Arc<dyn KeyValueStore>,
}

impl SidebarStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored state; unreadable storage means expanded
    pub async fn load(&self) -> SidebarState {
        match self.store.get(SIDEBAR_COLLAPSED_KEY).await {
            Ok(value) => SidebarState::from_stored(value.as_deref()),
            Err(e) => {
                warn!(error = %e, "Failed to read sidebar state, using default");
                SidebarState::default()
            }
        }
    }

    pub async fn save(&self, state: SidebarState) -> PortalResult<()> {
        self.store
            .set(SIDEBAR_COLLAPSED_KEY, state.as_stored())
            .await
    }

    /// Flip the mounted sidebar and persist the state it now shows
    pub async fn toggle<S>(&self, surface: &mut S) -> PortalResult<SidebarState>
    where
        S: LayoutSurface + Send + ?Sized,
    {
        let collapsed = surface
            .toggle_sidebar_collapsed()
            .ok_or_else(|| PortalError::NotFound {
                resource: "sidebar".to_string(),
                context: ErrorContext::new("sidebar_state").with_operation("toggle"),
            })?;

        let state = SidebarState { collapsed };
        self.save(state).await?;
        debug!(collapsed, "Sidebar toggled");
        Ok(state)
    }
}
