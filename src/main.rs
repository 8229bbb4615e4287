use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// knightos - package manager for KnightOS projects
#[derive(Parser)]
#[command(name = "knightos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project root (defaults to the nearest directory containing .knightos)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up a new project in the current directory
    Init {
        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Repository the project is published under
        #[arg(long)]
        repo: Option<String>,

        /// Link the default launcher, switcher and browser into pkgroot/bin
        #[arg(long)]
        link: bool,

        /// Packages to declare and install (e.g., core/init core/corelib)
        packages: Vec<String>,
    },

    /// Install packages and their dependencies
    Install {
        /// Packages to install (repo/name, optionally repo/name:constraint)
        packages: Vec<String>,

        /// Install without adding the packages to package.config
        #[arg(long)]
        site_only: bool,

        /// Link the default launcher, switcher and browser into pkgroot/bin
        #[arg(long)]
        link: bool,
    },

    /// List declared dependencies
    List,

    /// Read or change values in package.config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Regenerate .knightos/packages.make from installed packages
    Manifest,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a value
    Get {
        /// Configuration key (e.g., dependencies)
        key: String,
    },

    /// Set a value; an empty value removes the key
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("knightos=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = cli.root.as_deref();
    let result = match cli.command {
        Commands::Init {
            name,
            repo,
            link,
            packages,
        } => commands::init::run(root, name, repo, link, packages),
        Commands::Install {
            packages,
            site_only,
            link,
        } => commands::install::run(root, packages, site_only, link),
        Commands::List => commands::list::run(root),
        Commands::Config { action } => commands::config::run(root, &action),
        Commands::Manifest => commands::manifest::run(root),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "knightos", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
