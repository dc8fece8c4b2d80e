//! TUI application state and event handling

use crate::config::PanelSpec;
use crate::prefs::{CookieStore, Preferences};
use crate::toolbar::{
    CloseOutcome, FeedUpdate, HoverIntent, PanelController, PushEvent, RequestFeedController,
    RequestRow, RestoreOutcome, SortState, StickyPanelController,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

/// Which part of the toolbar has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tabs,
    Requests,
}

/// Events that can be sent to the TUI
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Message from the request feed
    Push(PushEvent),
    /// Key event from terminal
    Key(KeyEvent),
    /// Mouse event from terminal
    Mouse(MouseEvent),
    /// Terminal resized
    Resize(u16, u16),
    /// Pointer rested on the toolbar handle long enough
    HoverFired,
    /// Tick for periodic updates
    Tick,
}

/// TUI application state
pub struct TuiApp {
    pub panels: PanelController,
    pub sticky: StickyPanelController,
    pub feed: RequestFeedController,
    pub prefs: Preferences,
    store: Box<dyn CookieStore + Send>,
    hover: HoverIntent,
    pub restore: RestoreOutcome,
    pub focus: Focus,
    pub tab_cursor: usize,
    pub selected_row: usize,
    pub sort: SortState,
    pub detail: Option<RequestRow>,
    pub status_message: Option<String>,
    pub screen: Rect,
    pub should_quit: bool,
}

impl TuiApp {
    /// Wire up the controllers and run the startup sequence
    ///
    /// The sticky panel is restored before the feed connects, matching page
    /// load order.
    pub fn new(
        layout: &[PanelSpec],
        sticky: StickyPanelController,
        feed: RequestFeedController,
        store: Box<dyn CookieStore + Send>,
        hover: HoverIntent,
    ) -> Self {
        let mut prefs = Preferences::load(store.as_ref());
        let mut panels = PanelController::new(layout, &prefs);
        let restore = sticky.restore(&mut panels, &mut prefs);
        tracing::debug!("Sticky panel restore: {:?}", restore);

        let tab_cursor = restore
            .selected
            .as_deref()
            .and_then(|id| panels.panels().iter().position(|p| p.id == id))
            .unwrap_or(0);

        let mut app = Self {
            panels,
            sticky,
            feed,
            prefs,
            store,
            hover,
            restore,
            focus: Focus::Tabs,
            tab_cursor,
            selected_row: 0,
            sort: SortState::default(),
            detail: None,
            status_message: None,
            screen: Rect::default(),
            should_quit: false,
        };
        app.persist();
        app.feed.connect();
        app
    }

    /// Save changed preferences; storage failures are reported, never fatal
    fn persist(&mut self) {
        if !self.prefs.is_dirty() {
            return;
        }
        if let Err(e) = self.prefs.save(self.store.as_mut()) {
            tracing::warn!("Failed to save toolbar preferences: {}", e);
            self.status_message = Some(format!("Preferences not saved: {}", e));
        }
    }

    /// Rows in display order
    pub fn sorted_rows(&self) -> Vec<&RequestRow> {
        let rows = self.feed.rows();
        self.sort.apply(rows).into_iter().map(|i| &rows[i]).collect()
    }

    pub fn selected_request(&self) -> Option<&RequestRow> {
        self.sorted_rows().get(self.selected_row).copied()
    }

    /// Tooltip text for the selected row
    pub fn selected_tooltip(&self) -> Option<&str> {
        let row = self.selected_request()?;
        let index = self
            .feed
            .rows()
            .iter()
            .position(|r| std::ptr::eq(r, row))?;
        self.feed
            .tooltips()
            .iter()
            .find(|t| t.row == index)
            .map(|t| t.text.as_str())
    }

    fn cursor_panel_id(&self) -> Option<String> {
        self.panels
            .panels()
            .get(self.tab_cursor)
            .map(|p| p.id.clone())
    }

    /// Click on a panel tab
    pub fn click_tab(&mut self, id: &str) {
        let outcome = self.panels.click(id);
        tracing::debug!(
            "Tab {} clicked (selected: {}, propagate: {})",
            id,
            outcome.selected,
            outcome.propagate
        );
        self.sticky.record_click(id, &self.panels, &mut self.prefs);
        if outcome.selected {
            self.detail = None;
        }
        self.persist();
    }

    fn toggle_cursor_switch(&mut self) {
        if let Some(id) = self.cursor_panel_id() {
            if let Some(state) = self.panels.toggle_switch(&id, &mut self.prefs) {
                self.status_message = Some(format!("{} is now {}", id, state.as_str()));
            }
            self.persist();
        }
    }

    fn open_detail(&mut self) {
        let Some(row) = self.selected_request().cloned() else {
            return;
        };
        if self.panels.open_detail_window() {
            self.detail = Some(row);
        }
    }

    fn close(&mut self) {
        match self.panels.close(&mut self.prefs) {
            CloseOutcome::DetailWindow => self.detail = None,
            CloseOutcome::Toolbar => self.hover.leave(),
            CloseOutcome::Panel | CloseOutcome::Nothing => {}
        }
        self.persist();
    }

    fn toggle_toolbar(&mut self) {
        if self.panels.is_toolbar_visible() {
            self.panels.hide_toolbar(true, &mut self.prefs);
            self.detail = None;
        } else {
            self.hover.leave();
            self.panels.show_toolbar(false, &mut self.prefs);
        }
        self.persist();
    }

    fn open_in_browser(&mut self) {
        let Some(href) = self.selected_request().map(|r| r.href.clone()) else {
            return;
        };
        if let Err(e) = open::that(&href) {
            tracing::warn!("Failed to open {}: {}", href, e);
            self.status_message = Some(format!("Could not open {}", href));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.feed.rows().len();
        if len == 0 {
            self.selected_row = 0;
            return;
        }
        let next = self.selected_row as isize + delta;
        self.selected_row = next.clamp(0, len as isize - 1) as usize;
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            // Quit
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.should_quit = true;
            }
            (KeyCode::Esc, _) => self.close(),
            (KeyCode::Char('t'), _) => self.toggle_toolbar(),
            // Everything below needs the toolbar on screen
            _ if !self.panels.is_toolbar_visible() => {}
            (KeyCode::Tab, _) => {
                self.focus = match self.focus {
                    Focus::Tabs => Focus::Requests,
                    Focus::Requests => Focus::Tabs,
                };
            }
            (KeyCode::Char('r'), _) => {
                if self.feed.connect() {
                    self.status_message = Some("Reconnected to request feed".to_string());
                }
            }
            (KeyCode::Char('s'), _) => {
                let next = self.sort.column.next();
                self.sort.toggle(next);
            }
            (KeyCode::Char('S'), _) => {
                let column = self.sort.column;
                self.sort.toggle(column);
            }
            // Tab bar
            (KeyCode::Left | KeyCode::Char('h'), _) if self.focus == Focus::Tabs => {
                self.tab_cursor = self.tab_cursor.saturating_sub(1);
            }
            (KeyCode::Right | KeyCode::Char('l'), _) if self.focus == Focus::Tabs => {
                let last = self.panels.panels().len().saturating_sub(1);
                self.tab_cursor = (self.tab_cursor + 1).min(last);
            }
            (KeyCode::Enter, _) if self.focus == Focus::Tabs => {
                if let Some(id) = self.cursor_panel_id() {
                    self.click_tab(&id);
                }
            }
            (KeyCode::Char(' '), _) if self.focus == Focus::Tabs => self.toggle_cursor_switch(),
            // Request list
            (KeyCode::Up | KeyCode::Char('k'), _) if self.focus == Focus::Requests => {
                self.move_selection(-1);
            }
            (KeyCode::Down | KeyCode::Char('j'), _) if self.focus == Focus::Requests => {
                self.move_selection(1);
            }
            (KeyCode::Home, _) if self.focus == Focus::Requests => self.selected_row = 0,
            (KeyCode::End, _) if self.focus == Focus::Requests => {
                self.selected_row = self.feed.rows().len().saturating_sub(1);
            }
            (KeyCode::Enter, _) if self.focus == Focus::Requests => self.open_detail(),
            (KeyCode::Char('o'), _) if self.focus == Focus::Requests => self.open_in_browser(),
            _ => {}
        }
    }

    /// Mouse movement drives the hover timer on the minimised handle
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.panels.is_toolbar_visible() {
            return;
        }

        let position = Position::new(mouse.column, mouse.row);
        let on_handle = super::ui::handle_area(self.screen).contains(position);
        match mouse.kind {
            MouseEventKind::Moved if on_handle => {
                if !self.hover.is_pending() {
                    self.hover.enter();
                }
            }
            MouseEventKind::Moved => self.hover.leave(),
            MouseEventKind::Down(_) if on_handle => {
                self.hover.leave();
                self.panels.show_toolbar(false, &mut self.prefs);
                self.persist();
            }
            _ => {}
        }
    }

    /// Handle TUI event
    pub fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Push(event) => {
                if let FeedUpdate::Replaced(len) = self.feed.handle_event(event) {
                    self.selected_row = self.selected_row.min(len.saturating_sub(1));
                }
            }
            TuiEvent::Key(key) => self.handle_key(key),
            TuiEvent::Mouse(mouse) => self.handle_mouse(mouse),
            TuiEvent::Resize(width, height) => self.screen = Rect::new(0, 0, width, height),
            TuiEvent::HoverFired => {
                if !self.panels.is_toolbar_visible() {
                    self.panels.show_toolbar(true, &mut self.prefs);
                    self.persist();
                }
            }
            TuiEvent::Tick => {} // Just triggers a redraw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryCookies;
    use crate::toolbar::sticky::RestoreReason;
    use crate::toolbar::{EventSink, PushMessage};
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use debugbar_common::{constants, SseFrame};
    use reqwest::Url;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> TuiEvent {
        TuiEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app_with(store: MemoryCookies, layout: &[(&str, bool)]) -> TuiApp {
        let layout: Vec<PanelSpec> = layout
            .iter()
            .map(|(id, disabled)| PanelSpec {
                id: id.to_string(),
                title: None,
                disabled: *disabled,
            })
            .collect();
        let sink: EventSink = Arc::new(|_event: PushEvent| {});
        let feed = RequestFeedController::new(
            Url::parse("http://localhost:6543/_debug_toolbar/").unwrap(),
            "abc".to_string(),
            None,
            sink,
        );
        let (hover_tx, _hover_rx) = mpsc::channel(1);
        let hover = HoverIntent::new(Duration::from_millis(1000), hover_tx);

        TuiApp::new(
            &layout,
            StickyPanelController::new(false),
            feed,
            Box::new(store),
            hover,
        )
    }

    #[tokio::test]
    async fn test_startup_restores_sticky_panel() {
        let mut store = MemoryCookies::new();
        store.set(constants::STICKY_PANEL_COOKIE, "b", None).unwrap();
        let app = app_with(store, &[("a", false), ("b", false)]);

        assert_eq!(app.restore.reason, RestoreReason::Restored);
        assert_eq!(app.tab_cursor, 1);
        assert_eq!(app.panels.visible_panel().map(|p| p.id.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn test_enter_on_tab_selects_and_records() {
        let mut app = app_with(MemoryCookies::new(), &[("a", false), ("b", false)]);

        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Enter));

        assert_eq!(app.panels.visible_panel().map(|p| p.id.as_str()), Some("b"));
        assert_eq!(app.store.get(constants::STICKY_PANEL_COOKIE).as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_space_toggles_switch() {
        let mut app = app_with(MemoryCookies::new(), &[("a", false)]);

        app.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(app.store.get(constants::ACTIVE_PANELS_COOKIE).as_deref(), Some("a"));

        app.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(app.store.get(constants::ACTIVE_PANELS_COOKIE), None);
    }

    #[tokio::test]
    async fn test_escape_cascade_hides_toolbar() {
        let mut app = app_with(MemoryCookies::new(), &[("a", false)]);

        app.handle_event(key(KeyCode::Esc));
        assert!(app.panels.visible_panel().is_none());
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.panels.is_toolbar_visible());
        assert_eq!(app.store.get(constants::TOOLBAR_COOKIE).as_deref(), Some("hide"));

        // Hidden toolbar ignores panel keys
        app.handle_event(key(KeyCode::Enter));
        assert!(app.panels.visible_panel().is_none());

        app.handle_event(key(KeyCode::Char('t')));
        assert!(app.panels.is_toolbar_visible());
        assert_eq!(app.store.get(constants::TOOLBAR_COOKIE), None);
    }

    #[tokio::test]
    async fn test_hover_show_keeps_hide_cookie() {
        let mut app = app_with(MemoryCookies::new(), &[("a", false)]);
        app.handle_event(key(KeyCode::Char('t')));

        app.handle_event(TuiEvent::HoverFired);
        assert!(app.panels.is_toolbar_visible());
        assert_eq!(app.store.get(constants::TOOLBAR_COOKIE).as_deref(), Some("hide"));
    }

    #[tokio::test]
    async fn test_request_selection_and_detail_window() {
        let mut app = app_with(MemoryCookies::new(), &[("a", false)]);
        let batch = debugbar_common::RequestSummary::decode_batch(
            r#"[
                ["1", {"method":"GET","path":"/1","host":"h","scheme":"http","status_code":200}, ""],
                ["2", {"method":"POST","path":"/2","host":"h","scheme":"https","status_code":201}, "active"]
            ]"#,
        )
        .unwrap();
        app.feed.replace_rows(&batch);

        app.handle_event(key(KeyCode::Tab));
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Down));
        assert_eq!(app.selected_row, 1);
        assert_eq!(app.selected_tooltip(), Some("h/2"));

        app.handle_event(key(KeyCode::Enter));
        assert_eq!(app.detail.as_ref().map(|r| r.request_id.as_str()), Some("2"));
        assert!(app.panels.is_detail_window_open());

        app.handle_event(key(KeyCode::Esc));
        assert!(app.detail.is_none());
        assert!(app.panels.visible_panel().is_some());
    }

    #[tokio::test]
    async fn test_push_events_without_connection_are_ignored() {
        let mut app = app_with(MemoryCookies::new(), &[("a", false)]);
        app.handle_event(TuiEvent::Push(PushEvent {
            connection: 0,
            message: PushMessage::Frame(SseFrame {
                event: "new_request".to_string(),
                data: "[]".to_string(),
                id: None,
            }),
        }));
        assert!(app.feed.rows().is_empty());
    }
}
