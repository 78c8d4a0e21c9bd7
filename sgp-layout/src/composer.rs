//! Layout composer
//!
//! Wraps a protected page with the role-filtered sidebar in a single pass:
//! guard, identity, view model, render, mount, styles.

use crate::nav::ActivePage;
use crate::sidebar_state::SidebarStateStore;
use crate::surface::LayoutSurface;
use crate::templates::{render_sidebar, LAYOUT_STYLES};
use crate::view_model::{compose_sidebar, Branding, SidebarViewModel};
use sgp_core::{
    log_operation_error, log_operation_start, log_operation_success, LayoutConfig, PortalResult,
    SidebarState,
};
use sgp_session::SessionAccessor;
use std::sync::Arc;
use tracing::{debug, info};

/// What a composition pass did to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionOutcome {
    /// No session; the page was sent to login and left untouched
    Redirected,
    Composed {
        /// Ids of the navigation links shown, in order
        visible: Vec<String>,
        active: Option<String>,
        collapsed: bool,
    },
}

impl CompositionOutcome {
    pub fn is_redirected(&self) -> bool {
        matches!(self, CompositionOutcome::Redirected)
    }
}

pub struct LayoutComposer {
    accessor: Arc<SessionAccessor>,
    sidebar_state: SidebarStateStore,
    layout: LayoutConfig,
}

impl LayoutComposer {
    pub fn new(
        accessor: Arc<SessionAccessor>,
        sidebar_state: SidebarStateStore,
        layout: LayoutConfig,
    ) -> Self {
        Self {
            accessor,
            sidebar_state,
            layout,
        }
    }

    pub fn accessor(&self) -> &Arc<SessionAccessor> {
        &self.accessor
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Sidebar view model for the current session, without touching any page
    pub async fn sidebar_view(&self, page: &ActivePage) -> SidebarViewModel {
        let session = self.accessor.current_user().await;
        let state = self.sidebar_state.load().await;

        let mut view = compose_sidebar(&session, &self.layout.nav_items, state.collapsed)
            .with_branding(Branding::from(&self.layout));
        view.highlight(page);
        view
    }

    /// Compose the layout onto `surface`.
    ///
    /// Without a session this redirects to login and returns before the
    /// surface is modified.
    pub async fn compose<S>(
        &self,
        surface: &mut S,
        page: &ActivePage,
    ) -> PortalResult<CompositionOutcome>
    where
        S: LayoutSurface + Send + ?Sized,
    {
        if self.accessor.require_auth().await.is_redirected() {
            return Ok(CompositionOutcome::Redirected);
        }

        log_operation_start!("compose_layout", page = ?page);

        let view = self.sidebar_view(page).await;
        if view.is_empty() {
            debug!("No navigation items visible for the current role");
        }

        let sidebar = match render_sidebar(&view) {
            Ok(sidebar) => sidebar,
            Err(e) => {
                log_operation_error!("compose_layout", e);
                return Err(e);
            }
        };

        surface.mount_layout(sidebar)?;
        if !surface.inject_styles(LAYOUT_STYLES) {
            debug!("Layout styles already present");
        }

        let active = view.active_link().map(|link| link.id.clone());
        let visible: Vec<String> = view.nav.iter().map(|link| link.id.clone()).collect();

        log_operation_success!(
            "compose_layout",
            links = visible.len(),
            active = ?active,
            collapsed = view.collapsed
        );

        Ok(CompositionOutcome::Composed {
            visible,
            active,
            collapsed: view.collapsed,
        })
    }

    /// Flip the sidebar on `surface` and persist the result
    pub async fn toggle_sidebar<S>(&self, surface: &mut S) -> PortalResult<SidebarState>
    where
        S: LayoutSurface + Send + ?Sized,
    {
        self.sidebar_state.toggle(surface).await
    }

    /// Logout control of the sidebar
    pub async fn logout(&self) -> PortalResult<()> {
        info!("Logout requested from sidebar");
        self.accessor.logout().await
    }
}
