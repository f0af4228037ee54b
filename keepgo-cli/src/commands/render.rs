//! `keepgo render`: print the file `install` would write.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use keepgo_core::Host;
use keepgo_service::{validate_name, Registry};

use crate::service_file::ServiceFile;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Render for this init system (see `keepgo systems`) instead of the
    /// detected one.
    #[arg(long)]
    pub system: Option<String>,
}

impl RenderArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let file = ServiceFile::load(config)?;
        validate_name(&file.name)?;
        let service_config = Arc::new(file.to_config(config)?);
        let host = Host::system();

        let system = match &self.system {
            Some(name) => match super::all_systems().into_iter().find(|s| s.name() == name.as_str()) {
                Some(system) => system,
                None => {
                    let known: Vec<_> = super::all_systems().iter().map(|s| s.name()).collect();
                    bail!("unknown init system '{name}'; expected one of: {}", known.join(", "));
                }
            },
            None => {
                let registry = Registry::detect();
                registry
                    .available()
                    .iter()
                    .find(|s| s.name() == registry.platform())
                    .cloned()
                    .context("no supported init system detected; pass --system")?
            }
        };

        let backend = system.backend(host, service_config)?;
        let rendered = backend
            .render()
            .with_context(|| format!("failed to render {} config", system.name()))?;
        print!("{rendered}");
        Ok(())
    }
}
