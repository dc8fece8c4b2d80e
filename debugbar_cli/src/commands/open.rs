//! Open a toolbar page in the browser

use super::ToolbarOptions;
use crate::config::Config;
use anyhow::Result;
use console::style;
use reqwest::Url;

/// Full toolbar URL for a request; the root itself when no id is given
pub fn toolbar_url(root: &Url, request_id: &str) -> Result<Url> {
    Ok(root.join(request_id)?)
}

pub async fn run(opts: ToolbarOptions) -> Result<()> {
    let config = Config::load()?;
    let url = toolbar_url(&opts.root_url(&config)?, &opts.request_id)?;

    if open::that(url.as_str()).is_err() {
        cliclack::log::warning("Could not open browser automatically")?;
        cliclack::log::info(format!("Open this URL: {}", style(url.as_str()).cyan()))?;
        return Ok(());
    }

    cliclack::log::success(format!("Opened {}", style(url.as_str()).cyan()))?;
    Ok(())
}
