use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use knightos::{
    Config, Dependency, HttpRegistryClient, InstallOptions, Installer, KpackExtractor,
    ManifestGenerator, ProgressCallback, Project,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Per-package download display: a bar on a terminal, one line otherwise
struct DownloadReporter {
    interactive: bool,
    current: Mutex<Option<(String, ProgressBar)>>,
}

impl DownloadReporter {
    fn new() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal(),
            current: Mutex::new(None),
        }
    }

    /// A panic while drawing leaves the bar state usable
    fn current(&self) -> MutexGuard<'_, Option<(String, ProgressBar)>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, package: &str, written: u64, total: u64) {
        let mut current = self.current();

        let is_new = current.as_ref().map_or(true, |(name, _)| name != package);
        if is_new {
            if let Some((_, bar)) = current.take() {
                bar.finish();
            }
            *current = Some((package.to_string(), self.start(package, total)));
        }

        if let Some((_, bar)) = current.as_ref() {
            if total > 0 {
                bar.set_length(total);
            }
            bar.set_position(written);
        }
    }

    fn start(&self, package: &str, total: u64) -> ProgressBar {
        if !self.interactive {
            println!("Downloading {}", package);
            return ProgressBar::hidden();
        }

        let bar = if total > 0 {
            let style =
                ProgressStyle::with_template("Downloading {msg:<20} [{bar:30.cyan/blue}] {percent:>3}%")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> ");
            ProgressBar::new(total).with_style(style)
        } else {
            let style = ProgressStyle::with_template("{spinner:.green} Downloading {msg:<20} {bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
            ProgressBar::new_spinner().with_style(style)
        };
        bar.set_message(package.to_string());
        bar
    }

    fn finish(&self) {
        if let Some((_, bar)) = self.current().take() {
            bar.finish();
        }
    }
}

pub fn run(root: Option<&Path>, packages: Vec<String>, site_only: bool, link: bool) -> Result<()> {
    for package in &packages {
        package.parse::<Dependency>()?;
    }

    let project = super::open_project(root)?;
    let options = InstallOptions {
        site_only,
        link,
        ..Default::default()
    };
    install(&project, &packages, options)
}

/// Install into `project` with the user's registry, kpack and template settings
pub fn install(project: &Project, packages: &[String], options: InstallOptions) -> Result<()> {
    let config = Config::load()?;
    let registry = HttpRegistryClient::from_config(&config)?;
    let extractor = KpackExtractor::new(&config.tools.kpack);
    let manifest = ManifestGenerator::from_config(&config)?;

    let reporter = Arc::new(DownloadReporter::new());
    let callback: ProgressCallback = {
        let reporter = reporter.clone();
        Arc::new(move |package: &str, written: u64, total: u64| {
            reporter.report(package, written, total)
        })
    };

    let result = Installer::new(project, &registry, &extractor)
        .with_manifest(manifest)
        .with_progress(callback)
        .install(packages, options);
    reporter.finish();
    let installed = result?;

    if !installed.is_empty() {
        println!();
        println!("✓ Installed {} package(s)", installed.len());
        for package in &installed {
            println!("  {}", package);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn reporter() -> DownloadReporter {
        DownloadReporter {
            interactive: false,
            current: Mutex::new(None),
        }
    }

    fn tracked(reporter: &DownloadReporter) -> Option<(String, Option<u64>, u64)> {
        reporter
            .current()
            .as_ref()
            .map(|(name, bar)| (name.clone(), bar.length(), bar.position()))
    }

    #[test]
    fn test_report_switches_packages() {
        let reporter = reporter();

        reporter.report("core/corelib", 0, 2048);
        reporter.report("core/corelib", 1024, 2048);
        assert_eq!(
            tracked(&reporter),
            Some(("core/corelib".to_string(), Some(2048), 1024))
        );

        reporter.report("core/castle", 0, 0);
        assert_eq!(tracked(&reporter).map(|t| t.0), Some("core/castle".to_string()));

        reporter.finish();
        assert_eq!(tracked(&reporter), None);
    }

    #[test]
    fn test_report_survives_poisoned_lock() {
        let reporter = Arc::new(reporter());

        let poisoner = reporter.clone();
        let result = thread::spawn(move || {
            let _guard = poisoner.current.lock().unwrap();
            panic!("drawing failed");
        })
        .join();
        assert!(result.is_err());
        assert!(reporter.current.is_poisoned());

        reporter.report("x/y", 512, 1024);
        assert_eq!(tracked(&reporter), Some(("x/y".to_string(), Some(1024), 512)));
        reporter.finish();
    }
}
