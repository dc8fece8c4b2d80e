//! CLI configuration management

use anyhow::{Context, Result};
use debugbar_common::constants;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("debugbar")
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".debugbar")
    }
}

/// Get the config file path
pub fn config_file() -> PathBuf {
    config_dir().join("config.yml")
}

/// Get the cookie jar path
pub fn cookies_file() -> PathBuf {
    config_dir().join("cookies.json")
}

/// Get the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all config directories exist
pub fn ensure_dirs() -> Result<()> {
    let config = config_dir();
    let logs = logs_dir();

    fs::create_dir_all(&config).context("Failed to create config directory")?;
    fs::create_dir_all(&logs).context("Failed to create logs directory")?;

    Ok(())
}

/// A panel as laid out by the toolbar page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: String,

    /// Human readable tab title
    #[serde(default)]
    pub title: Option<String>,

    /// Panel renders nothing for this page
    #[serde(default)]
    pub disabled: bool,
}

impl PanelSpec {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: Some(title.to_string()),
            disabled: false,
        }
    }
}

/// Main configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Toolbar mount point (default: http://localhost:6543/_debug_toolbar/)
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Log sticky panel decisions
    #[serde(default)]
    pub debug_sticky: bool,

    /// Hover delay before the hidden toolbar pops up
    #[serde(default = "default_hover_delay_ms")]
    pub hover_delay_ms: u64,

    /// Panel layout, in tab order
    #[serde(default = "default_panels")]
    pub panels: Vec<PanelSpec>,
}

fn default_root_url() -> String {
    constants::DEFAULT_ROOT_URL.to_string()
}

fn default_hover_delay_ms() -> u64 {
    constants::HOVER_DELAY_MS
}

/// The toolbar's stock panel set
pub fn default_panels() -> Vec<PanelSpec> {
    vec![
        PanelSpec::new("pDebugVersionPanel", "Versions"),
        PanelSpec::new("pDebugHeaderPanel", "Headers"),
        PanelSpec::new("pDebugRequestVarsPanel", "Request Vars"),
        PanelSpec::new("pDebugRenderingsPanel", "Renderers"),
        PanelSpec::new("pDebugLoggingPanel", "Logging"),
        PanelSpec::new("pDebugPerformancePanel", "Performance"),
        PanelSpec::new("pDebugRoutesPanel", "Routes"),
        PanelSpec::new("pDebugSQLAPanel", "SQLAlchemy"),
        PanelSpec::new("pDebugTweensPanel", "Tweens"),
        PanelSpec::new("pDebugIntrospectionPanel", "Introspection"),
        PanelSpec::new("pDebugSessionPanel", "Session"),
        PanelSpec::new("pDebugTracebackPanel", "Traceback"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            debug_sticky: false,
            hover_delay_ms: default_hover_delay_ms(),
            panels: default_panels(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load() -> Result<Self> {
        let path = config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        let path = config_file();
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Toolbar root, always ending in `/`
    pub fn root(&self) -> String {
        normalize_root(&self.root_url)
    }

    /// Build the panel layout, applying `--panel` and `--disable` overrides
    ///
    /// Repeated ids keep only their first occurrence.
    pub fn layout(&self, only: &[String], disable: &[String]) -> Vec<PanelSpec> {
        let mut panels: Vec<PanelSpec> = if only.is_empty() {
            self.panels.clone()
        } else {
            only.iter()
                .map(|id| {
                    self.panels
                        .iter()
                        .find(|p| &p.id == id)
                        .cloned()
                        .unwrap_or_else(|| PanelSpec {
                            id: id.clone(),
                            title: None,
                            disabled: false,
                        })
                })
                .collect()
        };

        let mut seen = std::collections::HashSet::new();
        panels.retain(|p| seen.insert(p.id.clone()));

        for panel in &mut panels {
            if disable.contains(&panel.id) {
                panel.disabled = true;
            }
        }

        panels
    }
}

/// Make sure the toolbar root ends with a slash so ids can be appended
pub fn normalize_root(root: &str) -> String {
    if root.ends_with('/') {
        root.to_string()
    } else {
        format!("{}/", root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_yaml("debug_sticky: true\n").unwrap();
        assert!(config.debug_sticky);
        assert_eq!(config.root_url, constants::DEFAULT_ROOT_URL);
        assert_eq!(config.hover_delay_ms, 1000);
        assert_eq!(config.panels, default_panels());
    }

    #[test]
    fn test_panel_layout_from_yaml() {
        let yaml = "panels:\n  - id: a\n  - id: b\n    disabled: true\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.panels.len(), 2);
        assert!(!config.panels[0].disabled);
        assert!(config.panels[1].disabled);
    }

    #[test]
    fn test_layout_overrides() {
        let config = Config::default();
        let only = vec!["pDebugHeaderPanel".to_string(), "custom".to_string()];
        let disable = vec!["custom".to_string()];
        let layout = config.layout(&only, &disable);

        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].title.as_deref(), Some("Headers"));
        assert_eq!(layout[1].id, "custom");
        assert!(layout[1].disabled);
    }

    #[test]
    fn test_layout_drops_repeated_ids() {
        let only: Vec<String> = ["a", "b", "a"].iter().map(|s| s.to_string()).collect();
        let layout = Config::default().layout(&only, &[]);
        let ids: Vec<&str> = layout.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let yaml = "panels:\n  - id: a\n  - id: b\n  - id: a\n    disabled: true\n";
        let layout = Config::from_yaml(yaml).unwrap().layout(&[], &[]);
        assert_eq!(layout.len(), 2);
        assert!(!layout[0].disabled);
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root("http://x/_dt"), "http://x/_dt/");
        assert_eq!(normalize_root("http://x/_dt/"), "http://x/_dt/");
    }
}
