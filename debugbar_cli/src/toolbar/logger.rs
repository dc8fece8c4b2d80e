//! Switchable diagnostic logger
//!
//! Feature code logs unconditionally through a [`DebugLogger`]; whether
//! anything is emitted is decided once, at construction.

use std::fmt;

/// Labelled logger that is either live or a no-op
#[derive(Clone, Copy)]
pub struct DebugLogger {
    label: &'static str,
    enabled: bool,
    sink: fn(&str, fmt::Arguments<'_>),
}

fn emit(label: &str, message: fmt::Arguments<'_>) {
    tracing::debug!(target: "debugbar_cli::toolbar", "[{}] {}", label, message);
}

fn discard(_label: &str, _message: fmt::Arguments<'_>) {}

impl DebugLogger {
    pub fn new(label: &'static str, debugging: bool) -> Self {
        Self {
            label,
            enabled: debugging,
            sink: if debugging { emit } else { discard },
        }
    }

    pub fn log(&self, message: &str) {
        (self.sink)(self.label, format_args!("{}", message));
    }

    /// Log a formatted message; arguments are only rendered by a live sink
    pub fn log_fmt(&self, message: fmt::Arguments<'_>) {
        (self.sink)(self.label, message);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl fmt::Debug for DebugLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLogger")
            .field("label", &self.label)
            .field("enabled", &self.enabled)
            .finish()
    }
}
