use anyhow::{Context, Result};
use serene_core::config::RootConfig;
use serene_infrastructure::ConfigService;

pub fn show(config: &RootConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

pub fn path(service: &ConfigService) -> Result<()> {
    let path = service.config_path()?;
    let status = if path.exists() { "exists" } else { "not created, using defaults" };
    println!("{} ({})", path.display(), status);
    Ok(())
}
