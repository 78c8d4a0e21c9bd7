//! Core domain types: roles, sessions, navigation entries and sidebar state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Access level of the signed-in user.
///
/// Stored as a plain string. Values outside the known set are kept verbatim in
/// [`Role::Unknown`] so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Supervisor,
    Operator,
    Unknown(String),
}

impl Role {
    /// Parse a stored role value. Never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "supervisor" => Role::Supervisor,
            "operator" => Role::Operator,
            other => Role::Unknown(other.to_string()),
        }
    }

    /// The value written to storage
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Operator => "operator",
            Role::Unknown(raw) => raw,
        }
    }

    /// Human-readable label shown in the sidebar user block
    pub fn label(&self) -> &str {
        match self {
            Role::Admin => "Administrador",
            Role::Supervisor => "Supervisor",
            Role::Operator => "Operador",
            Role::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown(_))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::parse(s))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Authentication state as persisted by the login flow.
///
/// Token presence is the only authentication signal. The three fields are
/// stored independently and may disagree if storage is edited externally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            token: Some(token.into()),
            username: Some(username.into()),
            role: Some(role),
        }
    }

    /// An empty session, as seen after logout
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Name shown in the user block; empty when no username is stored
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }

    /// Role label shown in the user block; empty when no role is stored
    pub fn role_label(&self) -> &str {
        self.role.as_ref().map(Role::label).unwrap_or("")
    }
}

/// A static, role-gated sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Stable identifier, rendered as the page-identity marker
    pub id: String,
    pub label: String,
    /// Material Symbols icon name
    pub icon: String,
    /// Relative target path, treated as opaque
    pub path: String,
    /// Roles allowed to see the entry. Empty means hidden for everyone.
    pub roles: BTreeSet<Role>,
}

impl NavItem {
    pub fn new(id: &str, label: &str, icon: &str, path: &str, roles: &[Role]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            path: path.to_string(),
            roles: roles.iter().cloned().collect(),
        }
    }

    pub fn is_visible_to(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Final path segment with its extension removed.
    ///
    /// `../page_01/page_01.html` yields `page_01`.
    pub fn page_stem(&self) -> &str {
        path_stem(&self.path)
    }
}

/// Final segment of a `/`-separated path, without query, fragment or extension
pub fn path_stem(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(0) | None => segment,
        Some(idx) => &segment[..idx],
    }
}

/// The navigation table of the factory portal, in visual order
pub fn default_nav_items() -> Vec<NavItem> {
    use Role::*;

    vec![
        NavItem::new(
            "dashboard",
            "Dashboard BI",
            "analytics",
            "../page_07/page_07.html",
            &[Admin, Supervisor],
        ),
        NavItem::new(
            "gestao",
            "Gestão de OPs",
            "inventory_2",
            "../page_03/page_03.html",
            &[Admin, Supervisor],
        ),
        NavItem::new(
            "cockpit",
            "Cockpit VAC",
            "tune",
            "../page_04/page_04.html",
            &[Admin, Supervisor],
        ),
        NavItem::new(
            "monitor",
            "Monitor de Fábrica",
            "monitor",
            "../page_01/page_01.html",
            &[Admin, Supervisor, Operator],
        ),
        NavItem::new(
            "checklist",
            "Checklist Final",
            "checklist",
            "../page_05/page_05.html",
            &[Admin, Supervisor, Operator],
        ),
        NavItem::new(
            "config",
            "Configurações",
            "settings",
            "../page_06/page_06.html",
            &[Admin],
        ),
    ]
}

/// Collapse state of the sidebar, persisted independently of the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarState {
    pub collapsed: bool,
}

impl SidebarState {
    /// Parse the stored flag. Only the exact string `true` means collapsed.
    pub fn from_stored(value: Option<&str>) -> Self {
        Self {
            collapsed: value == Some("true"),
        }
    }

    pub fn as_stored(&self) -> &'static str {
        if self.collapsed {
            "true"
        } else {
            "false"
        }
    }

    pub fn toggled(self) -> Self {
        Self {
            collapsed: !self.collapsed,
        }
    }
}
