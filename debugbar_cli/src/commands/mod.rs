//! Subcommand implementations

pub mod feed;
pub mod init;
pub mod open;
pub mod prefs;
pub mod watch;

use crate::config::{normalize_root, Config};
use anyhow::{Context, Result};
use reqwest::Url;

/// Options shared by the commands that attach to a toolbar page
#[derive(Debug, Clone, Default)]
pub struct ToolbarOptions {
    /// Toolbar root override
    pub root: Option<String>,
    /// Id of the request whose toolbar is being shown
    pub request_id: String,
    /// Only lay out these panels
    pub panels: Vec<String>,
    /// Mark these panels disabled on this page
    pub disable: Vec<String>,
    /// Log sticky panel decisions
    pub debug_sticky: bool,
    /// Treat the page as having no server push support
    pub no_push: bool,
    /// Keep preferences in memory for this run only
    pub ephemeral: bool,
}

impl ToolbarOptions {
    /// Resolve the toolbar root: flag first, then config
    pub fn root_url(&self, config: &Config) -> Result<Url> {
        let root = match &self.root {
            Some(root) => normalize_root(root),
            None => config.root(),
        };
        Url::parse(&root).with_context(|| format!("Invalid toolbar root: {}", root))
    }
}
