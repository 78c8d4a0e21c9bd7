//! Sidebar view model
//!
//! Everything the sidebar shows, computed from the session and the static
//! navigation table without touching any UI surface.

use crate::nav::{filter_nav_items, ActivePage};
use serde::Serialize;
use sgp_core::{LayoutConfig, NavItem, Session};

/// Logo block text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branding {
    pub logo_text: String,
    pub logo_subtext: String,
}

impl Default for Branding {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            logo_text: layout.logo_text,
            logo_subtext: layout.logo_subtext,
        }
    }
}

impl From<&LayoutConfig> for Branding {
    fn from(layout: &LayoutConfig) -> Self {
        Self {
            logo_text: layout.logo_text.clone(),
            logo_subtext: layout.logo_subtext.clone(),
        }
    }
}

/// One rendered navigation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLinkView {
    /// Page-identity marker
    pub id: String,
    pub label: String,
    pub icon: String,
    pub path: String,
    pub active: bool,
}

impl From<&NavItem> for NavLinkView {
    fn from(item: &NavItem) -> Self {
        Self {
            id: item.id.clone(),
            label: item.label.clone(),
            icon: item.icon.clone(),
            path: item.path.clone(),
            active: false,
        }
    }
}

/// User identity block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserBlockView {
    pub display_name: String,
    pub role_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarViewModel {
    pub branding: Branding,
    pub nav: Vec<NavLinkView>,
    pub user: UserBlockView,
    pub collapsed: bool,
}

/// Build the sidebar for `session` from the declared navigation items
pub fn compose_sidebar(
    session: &Session,
    nav_items: &[NavItem],
    collapsed: bool,
) -> SidebarViewModel {
    let nav = filter_nav_items(nav_items, session.role.as_ref())
        .into_iter()
        .map(NavLinkView::from)
        .collect();

    SidebarViewModel {
        branding: Branding::default(),
        nav,
        user: UserBlockView {
            display_name: session.display_name().to_string(),
            role_label: session.role_label().to_string(),
        },
        collapsed,
    }
}

impl SidebarViewModel {
    pub fn with_branding(mut self, branding: Branding) -> Self {
        self.branding = branding;
        self
    }

    /// Mark the first link matching `page` as active and clear the rest.
    ///
    /// Returns the id of the active link, if any.
    pub fn highlight(&mut self, page: &ActivePage) -> Option<&str> {
        let mut found = None;
        for (index, link) in self.nav.iter_mut().enumerate() {
            link.active = found.is_none() && page.matches_link(&link.id, &link.path);
            if link.active {
                found = Some(index);
            }
        }
        found.map(|index| self.nav[index].id.as_str())
    }

    pub fn active_link(&self) -> Option<&NavLinkView> {
        self.nav.iter().find(|link| link.active)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.nav.iter().map(|link| link.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nav.is_empty()
    }
}
