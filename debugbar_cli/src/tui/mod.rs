//! Terminal User Interface for the debug toolbar

mod app;
mod ui;

pub use app::{TuiApp, TuiEvent};
pub use ui::draw;
