//! `keepgo install|uninstall|start|stop|restart`.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use keepgo_service::{control, ControlAction};

pub fn run(config: &Path, action: ControlAction) -> Result<()> {
    let service = super::open(config)?;
    control(&service, action.as_str())?;

    let verb = match action {
        ControlAction::Start => "started",
        ControlAction::Stop => "stopped",
        ControlAction::Restart => "restarted",
        ControlAction::Install => "installed",
        ControlAction::Uninstall => "uninstalled",
    };
    println!("{} {} ({})", verb.green(), service, service.platform());
    if action == ControlAction::Install {
        if let Ok(path) = service.config_path() {
            println!("  {}", path.display().to_string().bright_black());
        }
    }
    Ok(())
}
