use anyhow::{bail, Result};
use std::path::Path;

pub fn run(root: Option<&Path>, action: &crate::ConfigAction) -> Result<()> {
    use crate::ConfigAction;

    let project = super::open_project(root)?;
    let store = project.config();

    match action {
        ConfigAction::Get { key } => match store.read(key)? {
            Some(value) => println!("{}", value),
            None => bail!("'{}' is not set in {}", key, store.path().display()),
        },
        ConfigAction::Set { key, value } => {
            if key.is_empty() || key.contains('=') {
                bail!("Invalid key '{}'", key);
            }
            if !store.path().exists() {
                std::fs::write(store.path(), "")?;
            }
            store.set(key, value)?;
            if value.is_empty() {
                println!("✓ Removed {}", key);
            } else {
                println!("✓ Set {} = {}", key, value);
            }
        }
    }

    Ok(())
}
