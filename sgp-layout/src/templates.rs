//! Sidebar markup rendered with Askama.
//!
//! Every interpolated value is HTML-escaped by the template engine.

use crate::document::{Element, Node};
use crate::surface::{COLLAPSED_CLASS, SIDEBAR_ID};
use crate::view_model::SidebarViewModel;
use askama::Template;
use sgp_core::{render_error, PortalResult};

/// Stylesheet injected alongside the sidebar
pub const LAYOUT_STYLES: &str = include_str!("../assets/layout.css");

/// Sidebar contents template
#[derive(Template)]
#[template(path = "sidebar.html")]
pub struct SidebarTemplate<'a> {
    pub view: &'a SidebarViewModel,
}

/// Render the inner markup of the sidebar
pub fn render_sidebar_markup(view: &SidebarViewModel) -> PortalResult<String> {
    SidebarTemplate { view }
        .render()
        .map_err(|e| render_error!("Failed to render sidebar template", "sidebar_template", e))
}

/// Build the `<aside>` element for the view model, collapsed if requested
pub fn render_sidebar(view: &SidebarViewModel) -> PortalResult<Element> {
    let markup = render_sidebar_markup(view)?;

    let mut sidebar = Element::new("aside")
        .with_attr("id", SIDEBAR_ID)
        .with_class("sgp-sidebar")
        .with_child(Node::Raw(markup));
    if view.collapsed {
        sidebar.add_class(COLLAPSED_CLASS);
    }
    Ok(sidebar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::ActivePage;
    use crate::view_model::compose_sidebar;
    use sgp_core::{default_nav_items, Role, Session};

    #[test]
    fn test_markup_contract() {
        let session = Session::new("t1", "ana", Role::Operator);
        let mut view = compose_sidebar(&session, &default_nav_items(), false);
        view.highlight(&ActivePage::nav_id("checklist"));

        let html = render_sidebar_markup(&view).unwrap();
        assert!(html.contains(r#"data-action="toggle-sidebar""#));
        assert!(html.contains(r#"<nav class="sidebar-nav">"#));
        assert!(html.contains(
            r#"<a href="../page_01/page_01.html" class="nav-item" data-page="monitor">"#
        ));
        assert!(html.contains(
            r#"<a href="../page_05/page_05.html" class="nav-item active" data-page="checklist">"#
        ));
        assert!(html.contains(r#"<div class="user-name">ana</div>"#));
        assert!(html.contains(r#"<div class="user-role">Operador</div>"#));
        assert!(html.contains(r#"class="logout-btn" data-action="logout""#));
        assert!(html.contains("SGP Costura"));
        assert!(!html.contains("Configurações"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let session = Session::new("t1", "<img src=x>", Role::Unknown("a&b".to_string()));
        let view = compose_sidebar(&session, &default_nav_items(), false);

        let html = render_sidebar_markup(&view).unwrap();
        assert!(!html.contains("<img src=x>"));
        assert!(html.contains("&lt;img src=x&gt;"));
        assert!(html.contains("a&amp;b"));
    }

    #[test]
    fn test_aside_carries_collapse_state() {
        let session = Session::new("t1", "bo", Role::Admin);

        let expanded = render_sidebar(&compose_sidebar(&session, &default_nav_items(), false)).unwrap();
        assert_eq!(expanded.id(), Some(SIDEBAR_ID));
        assert!(!expanded.has_class(COLLAPSED_CLASS));

        let collapsed = render_sidebar(&compose_sidebar(&session, &default_nav_items(), true)).unwrap();
        assert!(collapsed.has_class("sgp-sidebar"));
        assert!(collapsed.has_class(COLLAPSED_CLASS));
    }
}
