//! SGP Layout - Layout composer for protected pages
//!
//! Builds the role-filtered navigation sidebar, relocates the existing page
//! content into a main region and keeps the collapse state in storage.
//!
//! ## Architecture
//!
//! - **nav**: role filtering and exact active-page matching
//! - **view_model**: [`compose_sidebar`], a pure function of session and navigation table
//! - **templates**: Askama rendering of the sidebar markup
//! - **document** / **surface**: the page tree and the [`LayoutSurface`] mutations on it
//! - **sidebar_state**: collapse flag persistence
//! - **composer**: [`LayoutComposer`], the single composition pass

pub mod composer;
pub mod document;
pub mod nav;
pub mod sidebar_state;
pub mod surface;
pub mod templates;
pub mod view_model;

pub use composer::{CompositionOutcome, LayoutComposer};
pub use document::{escape_html, Element, Node, PageDocument};
pub use nav::{filter_nav_items, ActivePage};
pub use sidebar_state::SidebarStateStore;
pub use surface::{LayoutSurface, COLLAPSED_CLASS, MAIN_CONTENT_CLASS, SIDEBAR_ID, STYLE_ELEMENT_ID};
pub use templates::{render_sidebar, render_sidebar_markup, LAYOUT_STYLES};
pub use view_model::{compose_sidebar, Branding, NavLinkView, SidebarViewModel, UserBlockView};
