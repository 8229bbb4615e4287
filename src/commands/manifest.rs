use anyhow::Result;
use knightos::{Config, ManifestGenerator};
use std::path::Path;

pub fn run(root: Option<&Path>) -> Result<()> {
    let project = super::open_project(root)?;
    let config = Config::load()?;

    let path = ManifestGenerator::from_config(&config)?.regenerate(&project)?;
    println!("✓ Wrote {}", path.display());

    Ok(())
}
