use anyhow::Result;
use knightos::Dependency;
use std::path::Path;

pub fn run(root: Option<&Path>) -> Result<()> {
    let project = super::open_project(root)?;
    let declared = project.declared();

    if declared.is_empty() {
        println!("No dependencies declared.");
        println!();
        println!("Add packages with: knightos install <repo/name>");
        return Ok(());
    }

    if let Some(full_name) = project.full_name() {
        println!("{}:", full_name);
    }
    for entry in &declared {
        match entry.parse::<Dependency>() {
            Ok(Dependency {
                id,
                constraint: Some(c),
            }) => println!("  {} ({})", id, c),
            _ => println!("  {}", entry),
        }
    }

    Ok(())
}
