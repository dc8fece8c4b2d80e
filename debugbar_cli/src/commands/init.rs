//! Write a starter config file

use crate::config::{config_file, Config};
use anyhow::Result;
use console::style;

pub async fn run(root: Option<String>, force: bool) -> Result<()> {
    use cliclack::{intro, outro, outro_cancel};

    intro(style(" debugbar init ").on_cyan().black().to_string())?;

    let path = config_file();
    if path.exists() && !force {
        outro_cancel(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    let mut config = Config::default();
    if let Some(root) = root {
        config.root_url = root;
    }
    config.save()?;

    cliclack::log::info(format!("Toolbar root: {}", style(config.root()).cyan()))?;
    outro(format!("Wrote {}", path.display()))?;
    Ok(())
}
