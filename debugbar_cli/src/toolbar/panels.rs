//! Panel selection, persistent-display switches and toolbar visibility
//!
//! State is kept per panel id in document order. [`PanelController::render`]
//! projects it into a [`PanelView`] that front ends draw from.

use crate::config::PanelSpec;
use crate::prefs::Preferences;
use debugbar_common::constants;
use std::collections::HashSet;

/// Runtime state of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Visible,
    Hidden,
    /// Not available on this page; never selectable
    Disabled,
}

/// Persistent-display opt in/out for a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Active,
    Inactive,
}

impl SwitchState {
    fn flipped(self) -> Self {
        match self {
            SwitchState::Active => SwitchState::Inactive,
            SwitchState::Inactive => SwitchState::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchState::Active => "active",
            SwitchState::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub state: PanelState,
    pub switch: SwitchState,
}

impl Panel {
    pub fn is_enabled(&self) -> bool {
        self.state != PanelState::Disabled
    }

    /// Id of the panel's content region
    pub fn content_id(&self) -> String {
        format!("{}{}", self.id, constants::CONTENT_SUFFIX)
    }
}

/// Result of a click on a panel tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    /// The clicked panel is now the visible one
    pub selected: bool,
    /// Whether the click may bubble to enclosing handlers
    pub propagate: bool,
}

/// What a close request ended up closing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    DetailWindow,
    Panel,
    Toolbar,
    Nothing,
}

/// One tab as the front end should draw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub disabled: bool,
    pub switch: SwitchState,
}

/// Render-ready projection of the panel state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub tabs: Vec<TabView>,
    /// Content region currently shown, if any
    pub visible_content: Option<String>,
    pub detail_window: bool,
    pub toolbar_visible: bool,
}

/// Owns which panel is displayed
#[derive(Debug)]
pub struct PanelController {
    panels: Vec<Panel>,
    detail_window_open: bool,
    toolbar_visible: bool,
}

impl PanelController {
    /// Build the controller from the page layout; switches start from the stored active list
    ///
    /// A repeated id keeps its first position; later copies are dropped.
    pub fn new(layout: &[PanelSpec], prefs: &Preferences) -> Self {
        let mut seen = HashSet::new();
        let panels = layout
            .iter()
            .filter(|spec| seen.insert(spec.id.as_str()))
            .map(|spec| Panel {
                id: spec.id.clone(),
                title: spec.title.clone().unwrap_or_else(|| spec.id.clone()),
                state: if spec.disabled {
                    PanelState::Disabled
                } else {
                    PanelState::Hidden
                },
                switch: if prefs.active_panels().contains(&spec.id) {
                    SwitchState::Active
                } else {
                    SwitchState::Inactive
                },
            })
            .collect();

        Self {
            panels,
            detail_window_open: false,
            toolbar_visible: !prefs.toolbar_hidden(),
        }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    /// First enabled panel in document order
    pub fn first_enabled(&self) -> Option<&Panel> {
        self.panels.iter().find(|p| p.is_enabled())
    }

    pub fn visible_panel(&self) -> Option<&Panel> {
        self.panels.iter().find(|p| p.state == PanelState::Visible)
    }

    pub fn is_toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub fn is_detail_window_open(&self) -> bool {
        self.detail_window_open
    }

    /// Show `id` as the only visible panel
    ///
    /// Returns `false` without touching anything when the panel is unknown
    /// or disabled.
    pub fn select_panel(&mut self, id: &str) -> bool {
        if !self.panel(id).is_some_and(Panel::is_enabled) {
            return false;
        }

        self.hide_all_panels();
        self.detail_window_open = false;

        for panel in &mut self.panels {
            if panel.id == id {
                panel.state = PanelState::Visible;
            }
        }

        true
    }

    /// Select the default panel: the first enabled one
    pub fn select_default(&mut self) -> Option<String> {
        let id = self.first_enabled()?.id.clone();
        self.select_panel(&id);
        Some(id)
    }

    /// Handle a click on a panel tab
    ///
    /// Clicks on disabled tabs are filtered. Tab clicks never propagate.
    pub fn click(&mut self, id: &str) -> ClickOutcome {
        let selected = match self.panel(id).map(Panel::is_enabled) {
            Some(true) => self.select_panel(id),
            Some(false) => {
                tracing::debug!("Ignoring click on disabled panel {}", id);
                false
            }
            None => false,
        };

        ClickOutcome {
            selected,
            propagate: false,
        }
    }

    /// Flip a panel's persistent-display switch and store the new active list
    pub fn toggle_switch(&mut self, id: &str, prefs: &mut Preferences) -> Option<SwitchState> {
        let panel = self.panels.iter_mut().find(|p| p.id == id)?;
        panel.switch = panel.switch.flipped();
        let now = panel.switch;

        let mut active: Vec<String> = prefs
            .active_panels()
            .iter()
            .filter(|name| name.as_str() != id)
            .cloned()
            .collect();
        if now == SwitchState::Active {
            active.push(id.to_string());
        }
        prefs.set_active_panels(active);

        Some(now)
    }

    /// Open the secondary detail window on top of the visible panel
    pub fn open_detail_window(&mut self) -> bool {
        if !self.toolbar_visible {
            return false;
        }
        self.detail_window_open = true;
        true
    }

    /// Close the innermost open thing: detail window, then panel, then toolbar
    pub fn close(&mut self, prefs: &mut Preferences) -> CloseOutcome {
        if self.detail_window_open {
            self.detail_window_open = false;
            return CloseOutcome::DetailWindow;
        }

        if self.visible_panel().is_some() {
            self.hide_all_panels();
            return CloseOutcome::Panel;
        }

        if self.toolbar_visible {
            self.hide_toolbar(true, prefs);
            return CloseOutcome::Toolbar;
        }

        CloseOutcome::Nothing
    }

    /// Minimise the toolbar, closing everything inside it
    pub fn hide_toolbar(&mut self, persist: bool, prefs: &mut Preferences) {
        self.detail_window_open = false;
        self.hide_all_panels();
        self.toolbar_visible = false;

        if persist {
            prefs.set_toolbar_hidden(true);
        }
    }

    /// Bring the toolbar back; a hover-triggered show keeps the hide preference
    pub fn show_toolbar(&mut self, auto: bool, prefs: &mut Preferences) {
        self.toolbar_visible = true;

        if !auto {
            prefs.set_toolbar_hidden(false);
        }
    }

    fn hide_all_panels(&mut self) {
        for panel in &mut self.panels {
            if panel.state == PanelState::Visible {
                panel.state = PanelState::Hidden;
            }
        }
    }

    /// Project the state for drawing
    pub fn render(&self) -> PanelView {
        let tabs = self
            .panels
            .iter()
            .map(|p| TabView {
                id: p.id.clone(),
                title: p.title.clone(),
                active: p.state == PanelState::Visible,
                disabled: p.state == PanelState::Disabled,
                switch: p.switch,
            })
            .collect();

        PanelView {
            tabs,
            visible_content: self.visible_panel().map(Panel::content_id),
            detail_window: self.detail_window_open,
            toolbar_visible: self.toolbar_visible,
        }
    }
}
