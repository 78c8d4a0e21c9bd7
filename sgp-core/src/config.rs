//! Configuration management

use crate::error::{ErrorContext, PortalError, PortalResult};
use crate::logging::LoggingConfig;
use crate::types::{default_nav_items, NavItem, Role};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level configuration of the portal shell
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub api: ApiConfig,
    pub routes: RouteConfig,
    pub layout: LayoutConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Backend API settings used by the authenticated fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that relative request paths resolve against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/api".to_string(),
            timeout_seconds: 30,
            user_agent: format!("sgp-portal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Redirect targets and per-role landing pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Login entry point, used by both the guard and logout
    pub login_path: String,
    pub admin_landing: String,
    pub supervisor_landing: String,
    /// Also the landing page for unknown or absent roles
    pub operator_landing: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "../login/login.html".to_string(),
            admin_landing: "../page_03/page_03.html".to_string(),
            supervisor_landing: "../page_03/page_03.html".to_string(),
            operator_landing: "../page_01/page_01.html".to_string(),
        }
    }
}

impl RouteConfig {
    /// Landing page for a role. Total over every role, including none.
    pub fn landing_page(&self, role: Option<&Role>) -> &str {
        match role {
            Some(Role::Admin) => &self.admin_landing,
            Some(Role::Supervisor) => &self.supervisor_landing,
            Some(Role::Operator) | Some(Role::Unknown(_)) | None => &self.operator_landing,
        }
    }
}

/// Branding and navigation table of the sidebar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub logo_text: String,
    pub logo_subtext: String,
    /// Entries in visual order
    pub nav_items: Vec<NavItem>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            logo_text: "DRX Têxtil".to_string(),
            logo_subtext: "SGP Costura".to_string(),
            nav_items: default_nav_items(),
        }
    }
}

/// Where the file-backed key/value store lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON store; `None` means the platform data directory
    pub path: Option<PathBuf>,
}

impl PortalConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> PortalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PortalError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> PortalResult<Self> {
        toml::from_str(content).map_err(|e| PortalError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> PortalResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PortalError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| PortalError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Apply `SGP_*` environment overrides on top of the loaded values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("SGP_API_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(login_path) = std::env::var("SGP_LOGIN_PATH") {
            self.routes.login_path = login_path;
        }
        if let Ok(path) = std::env::var("SGP_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Ok(level) = std::env::var("SGP_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> PortalResult<()> {
        if self.routes.login_path.trim().is_empty() {
            return Err(PortalError::Config {
                message: "Login path must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set routes.login_path"),
            });
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(PortalError::Config {
                message: format!("API base URL '{}' is not absolute: {}", self.api.base_url, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.base_url to an absolute http(s) URL"),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(PortalError::Config {
                message: "API timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        let mut seen = HashSet::new();
        for item in &self.layout.nav_items {
            if !seen.insert(item.id.as_str()) {
                return Err(PortalError::Validation {
                    message: format!("Duplicate navigation id '{}'", item.id),
                    field: Some("layout.nav_items".to_string()),
                    context: ErrorContext::new("config").with_operation("validate"),
                });
            }
            if item.roles.is_empty() {
                warn!(nav_id = %item.id, "Navigation item has no roles and will never be shown");
            }
        }

        Ok(())
    }
}
