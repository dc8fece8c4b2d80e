//! Sticky panel: reopen the last selected panel on the next run
//!
//! The last clicked panel id is kept in the `pdtb_sticky_panel_selected`
//! cookie. On startup [`StickyPanelController::restore`] tries to show it
//! again, falling back to the first enabled panel when it cannot.

use super::logger::DebugLogger;
use super::panels::PanelController;
use crate::prefs::Preferences;

/// Why restore picked the panel it picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreReason {
    /// No sticky cookie was set
    NoPreference,
    /// The sticky panel was shown again
    Restored,
    /// The sticky panel does not exist on this page
    Missing,
    /// The sticky panel exists but is disabled on this page
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub reason: RestoreReason,
    /// Panel now visible, `None` when no panel is enabled
    pub selected: Option<String>,
    /// Whether the sticky cookie was pointed at the fallback
    pub cookie_rewritten: bool,
}

#[derive(Debug)]
pub struct StickyPanelController {
    logger: DebugLogger,
}

impl StickyPanelController {
    pub fn new(debugging: bool) -> Self {
        Self {
            logger: DebugLogger::new("debugtoolbar_stickypanel", debugging),
        }
    }

    /// Decide which panel is visible at startup
    pub fn restore(&self, panels: &mut PanelController, prefs: &mut Preferences) -> RestoreOutcome {
        let Some(cookied) = prefs.sticky_panel().map(str::to_string) else {
            self.logger.log("No cookied panel detected");
            return self.fallback(panels, prefs, RestoreReason::NoPreference, false);
        };

        self.logger
            .log_fmt(format_args!("Activating Debug Toolbar Panel : {}", cookied));

        match panels.panel(&cookied).map(|p| p.is_enabled()) {
            None => {
                self.logger.log("The toolbar panel is not on this screen");
                self.logger.log("I will set a new cookie value if possible...");
                self.fallback(panels, prefs, RestoreReason::Missing, true)
            }
            Some(false) => {
                self.logger.log("The toolbar panel is disabled on this view.");
                self.fallback(panels, prefs, RestoreReason::Disabled, false)
            }
            Some(true) => {
                panels.select_panel(&cookied);
                RestoreOutcome {
                    reason: RestoreReason::Restored,
                    selected: Some(cookied),
                    cookie_rewritten: false,
                }
            }
        }
    }

    fn fallback(
        &self,
        panels: &mut PanelController,
        prefs: &mut Preferences,
        reason: RestoreReason,
        rewrite_cookie: bool,
    ) -> RestoreOutcome {
        self.logger.log("looking for an alternate panel...");

        let selected = panels.select_default();
        let cookie_rewritten = match &selected {
            Some(id) if rewrite_cookie => {
                prefs.set_sticky_panel(id);
                true
            }
            Some(_) => false,
            None => {
                self.logger.log("No enabled panel to show");
                false
            }
        };

        RestoreOutcome {
            reason,
            selected,
            cookie_rewritten,
        }
    }

    /// Remember a clicked tab, whatever the click itself did
    pub fn record_click(&self, id: &str, panels: &PanelController, prefs: &mut Preferences) {
        if panels.panel(id).is_some() {
            prefs.set_sticky_panel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelSpec;
    use crate::prefs::{CookieStore, MemoryCookies};
    use crate::toolbar::panels::PanelState;
    use debugbar_common::constants;

    fn layout(ids: &[(&str, bool)]) -> Vec<PanelSpec> {
        ids.iter()
            .map(|(id, disabled)| PanelSpec {
                id: id.to_string(),
                title: None,
                disabled: *disabled,
            })
            .collect()
    }

    struct Page {
        store: MemoryCookies,
        prefs: Preferences,
        panels: PanelController,
    }

    fn page(sticky: Option<&str>, ids: &[(&str, bool)]) -> Page {
        let mut store = MemoryCookies::new();
        if let Some(id) = sticky {
            store.set(constants::STICKY_PANEL_COOKIE, id, None).unwrap();
        }
        let prefs = Preferences::load(&store);
        let panels = PanelController::new(&layout(ids), &prefs);
        Page { store, prefs, panels }
    }

    fn restore(page: &mut Page) -> RestoreOutcome {
        let outcome = StickyPanelController::new(true).restore(&mut page.panels, &mut page.prefs);
        page.prefs.save(&mut page.store).unwrap();
        outcome
    }

    fn visible(page: &Page) -> Vec<&str> {
        page.panels
            .panels()
            .iter()
            .filter(|p| p.state == PanelState::Visible)
            .map(|p| p.id.as_str())
            .collect()
    }

    #[test]
    fn test_no_cookie_selects_first_enabled_without_writing() {
        let mut page = page(None, &[("a", true), ("b", false)]);
        let outcome = restore(&mut page);

        assert_eq!(outcome.reason, RestoreReason::NoPreference);
        assert_eq!(visible(&page), vec!["b"]);
        assert!(!outcome.cookie_rewritten);
        assert_eq!(page.store.get(constants::STICKY_PANEL_COOKIE), None);
        assert!(page.store.writes().is_empty());
    }

    #[test]
    fn test_missing_panel_falls_back_and_rewrites_cookie() {
        let mut page = page(Some("gone"), &[("a", false), ("b", false)]);
        let outcome = restore(&mut page);

        assert_eq!(outcome.reason, RestoreReason::Missing);
        assert_eq!(visible(&page), vec!["a"]);
        assert!(outcome.cookie_rewritten);
        assert_eq!(page.store.get(constants::STICKY_PANEL_COOKIE).as_deref(), Some("a"));
    }

    #[test]
    fn test_disabled_panel_falls_back_and_keeps_cookie() {
        let mut page = page(Some("b"), &[("a", false), ("b", true), ("c", false)]);
        let writes_before = page.store.writes().len();
        let outcome = restore(&mut page);

        assert_eq!(outcome.reason, RestoreReason::Disabled);
        assert_eq!(outcome.selected.as_deref(), Some("a"));
        assert_eq!(visible(&page), vec!["a"]);
        assert!(!outcome.cookie_rewritten);
        assert_eq!(page.store.get(constants::STICKY_PANEL_COOKIE).as_deref(), Some("b"));
        assert_eq!(page.store.writes().len(), writes_before);
    }

    #[test]
    fn test_enabled_panel_is_restored_without_rewrite() {
        let mut page = page(Some("c"), &[("a", false), ("b", false), ("c", false)]);
        let writes_before = page.store.writes().len();
        let outcome = restore(&mut page);

        assert_eq!(outcome.reason, RestoreReason::Restored);
        assert_eq!(visible(&page), vec!["c"]);
        assert_eq!(page.store.writes().len(), writes_before);
    }

    #[test]
    fn test_missing_panel_with_nothing_enabled_fails_quietly() {
        let mut page = page(Some("gone"), &[("a", true)]);
        let outcome = restore(&mut page);

        assert_eq!(outcome.reason, RestoreReason::Missing);
        assert_eq!(outcome.selected, None);
        assert!(!outcome.cookie_rewritten);
        assert_eq!(page.store.get(constants::STICKY_PANEL_COOKIE).as_deref(), Some("gone"));
    }

    #[test]
    fn test_absent_panel_container() {
        let mut page = page(Some("a"), &[]);
        let outcome = restore(&mut page);
        assert_eq!(outcome.selected, None);
        assert!(visible(&page).is_empty());

        let mut page = self::page(None, &[]);
        assert_eq!(restore(&mut page).selected, None);
    }

    #[test]
    fn test_exactly_one_visible_after_restore() {
        let layouts: Vec<Vec<(&str, bool)>> = vec![
            vec![("a", false)],
            vec![("a", true), ("b", false)],
            vec![("a", false), ("b", true), ("c", false)],
            vec![("a", true), ("b", true), ("c", false)],
        ];
        let cookies = [None, Some("a"), Some("b"), Some("c"), Some("zzz")];

        for ids in &layouts {
            for cookie in cookies {
                let mut page = page(cookie, ids);
                restore(&mut page);
                assert_eq!(visible(&page).len(), 1, "layout {:?} cookie {:?}", ids, cookie);
            }
        }
    }

    #[test]
    fn test_repeated_layout_id_shows_one_panel() {
        let mut page = page(Some("a"), &[("a", false), ("b", false), ("a", false)]);
        let outcome = restore(&mut page);

        assert_eq!(outcome.reason, RestoreReason::Restored);
        assert_eq!(visible(&page), vec!["a"]);
        assert_eq!(page.panels.panels().len(), 2);

        page.panels.click("b");
        assert_eq!(visible(&page), vec!["b"]);
        page.panels.click("a");
        assert_eq!(visible(&page), vec!["a"]);
    }

    #[test]
    fn test_click_updates_cookie_unconditionally() {
        let mut page = page(Some("b"), &[("a", false), ("b", true)]);
        let sticky = StickyPanelController::new(false);
        sticky.restore(&mut page.panels, &mut page.prefs);

        let outcome = page.panels.click("a");
        sticky.record_click("a", &page.panels, &mut page.prefs);
        page.prefs.save(&mut page.store).unwrap();
        assert!(outcome.selected);
        assert_eq!(visible(&page), vec!["a"]);
        assert_eq!(page.store.get(constants::STICKY_PANEL_COOKIE).as_deref(), Some("a"));

        // The disabled tab still records, even though it cannot be shown
        page.panels.click("b");
        sticky.record_click("b", &page.panels, &mut page.prefs);
        page.prefs.save(&mut page.store).unwrap();
        assert_eq!(visible(&page), vec!["a"]);
        assert_eq!(page.store.get(constants::STICKY_PANEL_COOKIE).as_deref(), Some("b"));

        sticky.record_click("unknown", &page.panels, &mut page.prefs);
        assert!(!page.prefs.is_dirty());
    }
}
