//! The UI surface the composer mounts into

use crate::document::{Element, Node, PageDocument};
use sgp_core::{render_error, PortalResult};

pub const SIDEBAR_ID: &str = "sgp-sidebar";
pub const COLLAPSED_CLASS: &str = "collapsed";
pub const MAIN_CONTENT_CLASS: &str = "sgp-main-content";
pub const STYLE_ELEMENT_ID: &str = "sgp-layout-styles";

/// Minimal set of mutations the layout composer performs on a page.
///
/// Everything else about the page stays opaque to the composer.
pub trait LayoutSurface {
    /// Move every existing body child, in order, into a main-content region
    /// and make `sidebar` and that region the only two body children.
    fn mount_layout(&mut self, sidebar: Element) -> PortalResult<()>;

    /// Add the layout stylesheet to the head; returns false if already present
    fn inject_styles(&mut self, css: &str) -> bool;

    /// Flip the collapsed flag on the mounted sidebar.
    ///
    /// Returns the new state, or `None` when no sidebar is mounted.
    fn toggle_sidebar_collapsed(&mut self) -> Option<bool>;

    fn is_sidebar_collapsed(&self) -> Option<bool>;
}

impl PageDocument {
    pub fn sidebar(&self) -> Option<&Element> {
        self.body.find_by_id(SIDEBAR_ID)
    }

    pub fn main_content(&self) -> Option<&Element> {
        self.body
            .child_elements()
            .find(|element| element.tag == "main" && element.has_class(MAIN_CONTENT_CLASS))
    }
}

impl LayoutSurface for PageDocument {
    fn mount_layout(&mut self, sidebar: Element) -> PortalResult<()> {
        if self.sidebar().is_some() {
            return Err(render_error!("Layout is already mounted on this page", "layout_surface"));
        }

        let existing = std::mem::take(&mut self.body.children);
        let mut main = Element::new("main").with_class(MAIN_CONTENT_CLASS);
        main.children = existing;

        self.body.children = vec![Node::Element(sidebar), Node::Element(main)];
        Ok(())
    }

    fn inject_styles(&mut self, css: &str) -> bool {
        if self.head.find_by_id(STYLE_ELEMENT_ID).is_some() {
            return false;
        }

        let style = Element::new("style")
            .with_attr("id", STYLE_ELEMENT_ID)
            .with_child(Node::Raw(css.to_string()));
        self.head.children.push(style.into());
        true
    }

    fn toggle_sidebar_collapsed(&mut self) -> Option<bool> {
        self.body
            .find_by_id_mut(SIDEBAR_ID)
            .map(|sidebar| sidebar.toggle_class(COLLAPSED_CLASS))
    }

    fn is_sidebar_collapsed(&self) -> Option<bool> {
        self.sidebar().map(|sidebar| sidebar.has_class(COLLAPSED_CLASS))
    }
}
