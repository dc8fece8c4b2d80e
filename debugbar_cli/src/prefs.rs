//! Cookie-backed toolbar preferences
//!
//! The toolbar remembers three things between runs: the sticky panel, the
//! panels opted into persistent display and whether the toolbar is hidden.
//! Each lives in its own small string cookie. Controllers only see the
//! [`Preferences`] value; cookie I/O goes through a [`CookieStore`].

use chrono::{DateTime, Duration, Utc};
use debugbar_common::constants;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Preference storage errors
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("Failed to access cookie jar: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize cookie jar: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Minimal cookie API the preferences are stored through
pub trait CookieStore {
    /// Read a cookie, `None` when absent or expired
    fn get(&self, name: &str) -> Option<String>;

    /// Write a cookie; `lifetime` of `None` makes it a session cookie
    fn set(&mut self, name: &str, value: &str, lifetime: Option<Duration>) -> Result<(), PrefsError>;

    /// Expire a cookie
    fn remove(&mut self, name: &str) -> Result<(), PrefsError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    #[serde(default)]
    expires: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |at| at > now)
    }
}

/// In-memory cookie store
#[derive(Debug, Default)]
pub struct MemoryCookies {
    cookies: BTreeMap<String, StoredCookie>,
    /// Names written or removed, in order
    #[cfg(test)]
    writes: Vec<String>,
}

impl MemoryCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of cookies touched so far, oldest first
    #[cfg(test)]
    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl CookieStore for MemoryCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|c| c.is_live(Utc::now()))
            .map(|c| c.value.clone())
    }

    fn set(&mut self, name: &str, value: &str, lifetime: Option<Duration>) -> Result<(), PrefsError> {
        self.cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires: lifetime.map(|l| Utc::now() + l),
            },
        );
        #[cfg(test)]
        self.writes.push(name.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), PrefsError> {
        self.cookies.remove(name);
        #[cfg(test)]
        self.writes.push(name.to_string());
        Ok(())
    }
}

/// Cookie jar persisted as JSON on disk
///
/// Session cookies are written too; a terminal session has no browser
/// lifetime to bind them to.
#[derive(Debug)]
pub struct CookieJar {
    path: PathBuf,
    cookies: BTreeMap<String, StoredCookie>,
}

impl CookieJar {
    /// Open the jar at `path`, starting empty when missing or unreadable
    pub fn open(path: PathBuf) -> Self {
        let cookies = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt cookie jar {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self { path, cookies }
    }

    /// Open the jar in the config directory
    pub fn open_default() -> Self {
        Self::open(crate::config::cookies_file())
    }

    /// Live cookies, for display
    pub fn entries(&self) -> Vec<(String, String, Option<DateTime<Utc>>)> {
        let now = Utc::now();
        self.cookies
            .iter()
            .filter(|(_, c)| c.is_live(now))
            .map(|(name, c)| (name.clone(), c.value.clone(), c.expires))
            .collect()
    }

    /// Drop every cookie
    pub fn clear(&mut self) -> Result<(), PrefsError> {
        self.cookies.clear();
        self.flush()
    }

    fn flush(&mut self) -> Result<(), PrefsError> {
        let now = Utc::now();
        self.cookies.retain(|_, c| c.is_live(now));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.cookies)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CookieStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|c| c.is_live(Utc::now()))
            .map(|c| c.value.clone())
    }

    fn set(&mut self, name: &str, value: &str, lifetime: Option<Duration>) -> Result<(), PrefsError> {
        self.cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires: lifetime.map(|l| Utc::now() + l),
            },
        );
        self.flush()
    }

    fn remove(&mut self, name: &str) -> Result<(), PrefsError> {
        if self.cookies.remove(name).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Toolbar preferences, loaded from and saved to cookies
///
/// Setters mark a field dirty; [`Preferences::save`] writes only dirty
/// fields so a restore that keeps the sticky panel never rewrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    sticky_panel: Option<String>,
    active_panels: Vec<String>,
    toolbar_hidden: bool,
    dirty: Dirty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Dirty {
    sticky: bool,
    active: bool,
    toolbar: bool,
}

impl Preferences {
    /// Read all preference cookies; blank or malformed values mean "no preference"
    pub fn load(store: &dyn CookieStore) -> Self {
        let sticky_panel = store
            .get(constants::STICKY_PANEL_COOKIE)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let active_panels = store
            .get(constants::ACTIVE_PANELS_COOKIE)
            .map(|v| parse_panel_list(&v))
            .unwrap_or_default();

        let toolbar_hidden = store
            .get(constants::TOOLBAR_COOKIE)
            .is_some_and(|v| v == constants::TOOLBAR_HIDDEN_VALUE);

        Self {
            sticky_panel,
            active_panels,
            toolbar_hidden,
            dirty: Dirty::default(),
        }
    }

    /// Write changed preferences back to the store
    pub fn save(&mut self, store: &mut dyn CookieStore) -> Result<(), PrefsError> {
        let lifetime = Some(Duration::days(constants::COOKIE_LIFETIME_DAYS));

        if self.dirty.sticky {
            match &self.sticky_panel {
                Some(id) => store.set(constants::STICKY_PANEL_COOKIE, id, None)?,
                None => store.remove(constants::STICKY_PANEL_COOKIE)?,
            }
        }

        if self.dirty.active {
            if self.active_panels.is_empty() {
                store.remove(constants::ACTIVE_PANELS_COOKIE)?;
            } else {
                let joined = self
                    .active_panels
                    .join(&constants::PANEL_LIST_DELIMITER.to_string());
                store.set(constants::ACTIVE_PANELS_COOKIE, &joined, lifetime)?;
            }
        }

        if self.dirty.toolbar {
            if self.toolbar_hidden {
                store.set(constants::TOOLBAR_COOKIE, constants::TOOLBAR_HIDDEN_VALUE, lifetime)?;
            } else {
                store.remove(constants::TOOLBAR_COOKIE)?;
            }
        }

        self.dirty = Dirty::default();
        Ok(())
    }

    pub fn sticky_panel(&self) -> Option<&str> {
        self.sticky_panel.as_deref()
    }

    pub fn set_sticky_panel(&mut self, id: &str) {
        self.sticky_panel = Some(id.to_string());
        self.dirty.sticky = true;
    }

    pub fn active_panels(&self) -> &[String] {
        &self.active_panels
    }

    pub fn set_active_panels(&mut self, panels: Vec<String>) {
        self.active_panels = panels;
        self.dirty.active = true;
    }

    pub fn toolbar_hidden(&self) -> bool {
        self.toolbar_hidden
    }

    pub fn set_toolbar_hidden(&mut self, hidden: bool) {
        self.toolbar_hidden = hidden;
        self.dirty.toolbar = true;
    }

    /// Whether anything changed since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty != Dirty::default()
    }
}

/// Split a stored panel list
///
/// Writes always use `,`; older toolbars used `;` or spaces, so those are
/// accepted on read.
fn parse_panel_list(value: &str) -> Vec<String> {
    let mut panels: Vec<String> = Vec::new();
    for id in value.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        if !id.is_empty() && !panels.iter().any(|p| p == id) {
            panels.push(id.to_string());
        }
    }
    panels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_jar_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("debugbar-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_load_empty_store() {
        let store = MemoryCookies::new();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.sticky_panel(), None);
        assert!(prefs.active_panels().is_empty());
        assert!(!prefs.toolbar_hidden());
        assert!(!prefs.is_dirty());
    }

    #[test]
    fn test_blank_sticky_cookie_is_no_preference() {
        let mut store = MemoryCookies::new();
        store.set(constants::STICKY_PANEL_COOKIE, "  ", None).unwrap();
        assert_eq!(Preferences::load(&store).sticky_panel(), None);
    }

    #[test]
    fn test_save_writes_only_dirty_fields() {
        let mut store = MemoryCookies::new();
        store.set(constants::STICKY_PANEL_COOKIE, "pDebugHeaderPanel", None).unwrap();
        let before = store.writes().len();

        let mut prefs = Preferences::load(&store);
        prefs.save(&mut store).unwrap();
        assert_eq!(store.writes().len(), before);

        prefs.set_toolbar_hidden(true);
        prefs.save(&mut store).unwrap();
        assert_eq!(&store.writes()[before..], &[constants::TOOLBAR_COOKIE.to_string()]);
        assert_eq!(store.get(constants::TOOLBAR_COOKIE).as_deref(), Some("hide"));
        assert!(!prefs.is_dirty());
    }

    #[test]
    fn test_active_panels_use_comma_and_clear_when_empty() {
        let mut store = MemoryCookies::new();
        let mut prefs = Preferences::load(&store);

        prefs.set_active_panels(vec!["a".to_string(), "b".to_string()]);
        prefs.save(&mut store).unwrap();
        assert_eq!(store.get(constants::ACTIVE_PANELS_COOKIE).as_deref(), Some("a,b"));

        prefs.set_active_panels(Vec::new());
        prefs.save(&mut store).unwrap();
        assert_eq!(store.get(constants::ACTIVE_PANELS_COOKIE), None);
    }

    #[test]
    fn test_legacy_delimiters_are_read() {
        assert_eq!(parse_panel_list("a;b c,d"), vec!["a", "b", "c", "d"]);
        assert_eq!(parse_panel_list("a,,a, b"), vec!["a", "b"]);
        assert!(parse_panel_list(" ; ,").is_empty());
    }

    #[test]
    fn test_toolbar_cookie_other_value_is_visible() {
        let mut store = MemoryCookies::new();
        store.set(constants::TOOLBAR_COOKIE, "show", None).unwrap();
        assert!(!Preferences::load(&store).toolbar_hidden());
    }

    #[test]
    fn test_memory_cookie_expiry() {
        let mut store = MemoryCookies::new();
        store.set("old", "v", Some(Duration::seconds(-1))).unwrap();
        assert_eq!(store.get("old"), None);
    }

    #[test]
    fn test_cookie_jar_persists() {
        let path = temp_jar_path("persist");
        let _ = fs::remove_file(&path);

        let mut jar = CookieJar::open(path.clone());
        let mut prefs = Preferences::load(&jar);
        prefs.set_sticky_panel("pDebugRoutesPanel");
        prefs.set_active_panels(vec!["x".to_string()]);
        prefs.save(&mut jar).unwrap();

        let reopened = CookieJar::open(path.clone());
        let prefs = Preferences::load(&reopened);
        assert_eq!(prefs.sticky_panel(), Some("pDebugRoutesPanel"));
        assert_eq!(prefs.active_panels(), &["x".to_string()]);
        assert_eq!(reopened.entries().len(), 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_cookie_jar_corrupt_file_starts_empty() {
        let path = temp_jar_path("corrupt");
        fs::write(&path, "{ not json").unwrap();

        let mut jar = CookieJar::open(path.clone());
        assert!(jar.entries().is_empty());
        jar.set("a", "b", None).unwrap();
        jar.clear().unwrap();
        assert!(CookieJar::open(path.clone()).entries().is_empty());

        let _ = fs::remove_file(&path);
    }
}
