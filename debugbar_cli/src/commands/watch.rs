//! Interactive toolbar in the terminal

use super::ToolbarOptions;
use crate::config::Config;
use crate::prefs::{CookieJar, CookieStore, MemoryCookies};
use crate::sse::SseChannel;
use crate::toolbar::{
    EventSink, HoverFired, HoverIntent, PushChannel, PushEvent, RequestFeedController,
    StickyPanelController,
};
use crate::tui::{TuiApp, TuiEvent};
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the toolbar TUI until the user quits
pub async fn run(opts: ToolbarOptions) -> Result<()> {
    let config = Config::load()?;
    let root = opts.root_url(&config)?;
    let layout = config.layout(&opts.panels, &opts.disable);

    let channel: Option<Box<dyn PushChannel>> = if opts.no_push {
        None
    } else {
        Some(Box::new(SseChannel::new()?))
    };

    let (push_tx, mut push_rx) = mpsc::unbounded_channel::<PushEvent>();
    let sink: EventSink = Arc::new(move |event: PushEvent| {
        let _ = push_tx.send(event);
    });
    let feed = RequestFeedController::new(root, opts.request_id.clone(), channel, sink);

    let (hover_tx, mut hover_rx) = mpsc::channel::<HoverFired>(4);
    let hover = HoverIntent::new(Duration::from_millis(config.hover_delay_ms), hover_tx);

    let sticky = StickyPanelController::new(opts.debug_sticky || config.debug_sticky);
    let store: Box<dyn CookieStore + Send> = if opts.ephemeral {
        Box::new(MemoryCookies::new())
    } else {
        Box::new(CookieJar::open_default())
    };
    let mut app = TuiApp::new(&layout, sticky, feed, store, hover);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.handle_event(TuiEvent::Resize(size.width, size.height));

    let result = run_tui_loop(&mut terminal, &mut app, &mut push_rx, &mut hover_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if app.feed.is_connected() {
        app.feed.disconnect();
    }
    result
}

async fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    push_rx: &mut mpsc::UnboundedReceiver<PushEvent>,
    hover_rx: &mut mpsc::Receiver<HoverFired>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal.draw(|f| crate::tui::draw(f, app))?;

        tokio::select! {
            // Terminal input (non-blocking)
            _ = tick_interval.tick() => {
                while event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            app.handle_event(TuiEvent::Key(key));
                        }
                        Event::Mouse(mouse) => app.handle_event(TuiEvent::Mouse(mouse)),
                        Event::Resize(width, height) => {
                            app.handle_event(TuiEvent::Resize(width, height));
                        }
                        _ => {}
                    }
                }
                app.handle_event(TuiEvent::Tick);
            }

            Some(event) = push_rx.recv() => {
                app.handle_event(TuiEvent::Push(event));
            }

            Some(HoverFired) = hover_rx.recv() => {
                app.handle_event(TuiEvent::HoverFired);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
