//! Inspect and reset the stored toolbar preferences

use crate::prefs::{CookieJar, Preferences};
use anyhow::{Context, Result};
use console::style;

/// List stored cookies and the preferences they decode to
pub async fn show() -> Result<()> {
    let jar = CookieJar::open_default();
    let entries = jar.entries();

    if entries.is_empty() {
        println!("No toolbar preferences stored.");
        return Ok(());
    }

    println!("{:<28} {:<40} {:<20}", "COOKIE", "VALUE", "EXPIRES");
    println!("{}", "-".repeat(88));

    for (name, value, expires) in &entries {
        let expires = expires
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "session".to_string());
        println!("{:<28} {:<40} {:<20}", name, truncate(value, 38), expires);
    }

    let prefs = Preferences::load(&jar);
    println!();
    println!(
        "Sticky panel   {}",
        style(prefs.sticky_panel().unwrap_or("-")).cyan()
    );
    println!(
        "Active panels  {}",
        style(if prefs.active_panels().is_empty() {
            "-".to_string()
        } else {
            prefs.active_panels().join(", ")
        })
        .cyan()
    );
    println!(
        "Toolbar        {}",
        if prefs.toolbar_hidden() {
            style("hidden").yellow()
        } else {
            style("shown").green()
        }
    );

    Ok(())
}

/// Forget every stored preference
pub async fn reset(yes: bool) -> Result<()> {
    use cliclack::{confirm, intro, outro, outro_cancel};

    intro(style(" debugbar prefs reset ").on_cyan().black().to_string())?;

    if !yes {
        let confirmed = confirm("Clear the sticky panel, active panels and toolbar state?")
            .initial_value(false)
            .interact()?;
        if !confirmed {
            outro_cancel("Nothing changed")?;
            return Ok(());
        }
    }

    let mut jar = CookieJar::open_default();
    jar.clear().context("Failed to clear cookie jar")?;

    outro("Toolbar preferences cleared")?;
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
