use anyhow::Result;
use knightos::{
    link_ui, Config, Dependency, InstallOptions, ManifestGenerator, Project, PACKAGE_CONFIG_NAME,
    STATE_DIR_NAME,
};
use std::env;
use std::fs;
use std::path::Path;

pub fn run(
    root: Option<&Path>,
    name: Option<String>,
    repo: Option<String>,
    link: bool,
    packages: Vec<String>,
) -> Result<()> {
    for package in &packages {
        package.parse::<Dependency>()?;
    }

    let root = match root {
        Some(root) => root.to_path_buf(),
        None => env::current_dir()?,
    };
    fs::create_dir_all(&root)?;
    let root = root.canonicalize()?;

    if root.join(STATE_DIR_NAME).is_dir() {
        println!("✓ {} already exists in this directory", STATE_DIR_NAME);
        println!();
        println!("Use 'knightos install <package>' to add dependencies.");
        return Ok(());
    }

    println!("Initializing KnightOS project...");
    println!();

    fs::create_dir_all(root.join(STATE_DIR_NAME))?;
    let project = Project::open(&root);
    write_package_config(&project, name, repo, &packages)?;
    println!("✓ Wrote {}", PACKAGE_CONFIG_NAME);

    if packages.is_empty() {
        if link {
            link_ui(&project.pkgroot())?;
        }
        ManifestGenerator::from_config(&Config::load()?)?.regenerate(&project)?;
    } else {
        let options = InstallOptions {
            init: true,
            link,
            ..Default::default()
        };
        super::install::install(&project, &packages, options)?;
    }

    println!();
    println!("Next steps:");
    println!("  • Add dependencies: knightos install <repo/name>");
    println!("  • View declared dependencies: knightos list");
    println!();

    Ok(())
}

/// Seed `package.config`, keeping any values already present
fn write_package_config(
    project: &Project,
    name: Option<String>,
    repo: Option<String>,
    packages: &[String],
) -> Result<()> {
    let store = project.config();
    if !store.path().exists() {
        fs::write(store.path(), "")?;
    }

    let name = name.or_else(|| store.get("name")).or_else(|| {
        project
            .root()
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    });
    if let Some(name) = name {
        store.set("name", &name)?;
    }
    if let Some(repo) = repo {
        store.set("repo", &repo)?;
    }

    let mut declared = project.declared();
    declared.extend(packages.iter().cloned());
    store.set("dependencies", &declared.join(" "))?;

    Ok(())
}
