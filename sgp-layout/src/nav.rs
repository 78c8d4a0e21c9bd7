//! Role filtering and active-page matching for the navigation list

use sgp_core::{path_stem, NavItem, Role};

/// Items visible to `role`, in declaration order.
///
/// No role means no items.
pub fn filter_nav_items<'a>(items: &'a [NavItem], role: Option<&Role>) -> Vec<&'a NavItem> {
    match role {
        Some(role) => items.iter().filter(|item| item.is_visible_to(role)).collect(),
        None => Vec::new(),
    }
}

/// Identity of the page being composed.
///
/// Matching is by exact equality only, never by substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivePage {
    /// The page declares the id of its navigation entry
    NavId(String),
    /// The page is known by its path stem, e.g. `page_01`
    PageStem(String),
    /// A page with no navigation entry (nothing is highlighted)
    Unlisted,
}

impl ActivePage {
    pub fn nav_id(id: impl Into<String>) -> Self {
        ActivePage::NavId(id.into())
    }

    /// Identify the page by its own location, e.g. `/telas/page_01/page_01.html`
    pub fn from_path(path: &str) -> Self {
        match path_stem(path) {
            "" => ActivePage::Unlisted,
            stem => ActivePage::PageStem(stem.to_string()),
        }
    }

    pub fn matches(&self, item: &NavItem) -> bool {
        self.matches_link(&item.id, &item.path)
    }

    /// Match against a link's page-identity marker and target path
    pub fn matches_link(&self, id: &str, path: &str) -> bool {
        match self {
            ActivePage::NavId(page_id) => page_id == id,
            ActivePage::PageStem(stem) => path_stem(path) == stem,
            ActivePage::Unlisted => false,
        }
    }

    /// Position of the first item matching this page
    pub fn position_in<'a, I>(&self, items: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a NavItem>,
    {
        items.into_iter().position(|item| self.matches(item))
    }
}
