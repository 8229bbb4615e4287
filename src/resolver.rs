//! Implicit dependency discovery
//!
//! The resolver asks the registry for each requested package's dependency
//! list and collects the ones the project does not already declare. It does
//! not evaluate version constraints and does not detect conflicts.
//!
//! Only the dependency lists of the *requested* packages are consulted; the
//! dependencies of those dependencies are not fetched. The registry is
//! expected to publish flattened dependency lists.
//!
//! # Examples
//!
//! ```no_run
//! use knightos::{resolve_implicit, Config, HttpRegistryClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = HttpRegistryClient::from_config(&Config::load()?)?;
//! let requested = vec!["core/castle".to_string()];
//! let declared = vec!["core/init".to_string()];
//!
//! let extra = resolve_implicit(&registry, &requested, &declared, Some("extra/demo"))?;
//! println!("{} additional packages", extra.len());
//! # Ok(())
//! # }
//! ```

use crate::{Dependency, Registry, Result};

/// Compute the packages pulled in by `requested` that are not yet declared
///
/// Returns newly discovered packages as bare `repo/name` ids, in discovery
/// order. Constraints on registry dependencies are dropped. A dependency on
/// `self_id` is satisfied by the project itself and is skipped with a notice.
/// Any registry failure aborts the whole resolution.
pub fn resolve_implicit<R: Registry + ?Sized>(
    registry: &R,
    requested: &[String],
    explicit: &[String],
    self_id: Option<&str>,
) -> Result<Vec<String>> {
    let mut extra: Vec<String> = Vec::new();

    for package in requested {
        let metadata = registry.fetch_metadata(Dependency::bare_id(package))?;
        tracing::debug!(
            package = %metadata.full_name,
            dependencies = metadata.dependencies.len(),
            "resolved package metadata"
        );

        for dep in &metadata.dependencies {
            let id = Dependency::bare_id(dep);
            if extra.iter().any(|e| e == id) || explicit.iter().any(|e| e == id) {
                continue;
            }
            if Some(id) == self_id {
                println!(
                    "Notice: this project fulfills the '{}' dependency, skipping",
                    id
                );
                continue;
            }
            println!("Adding dependency: {}", id);
            extra.push(id.to_string());
        }
    }

    Ok(extra)
}
