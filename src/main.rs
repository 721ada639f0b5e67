use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use colored::*;
use std::io;
use std::time::{Duration, Instant};

use terminus_plugins::error::TerminusResult;
use terminus_plugins::probe::ProbeClient;
use terminus_plugins::registry::{AddOutcome, RegistryStore, RemoveOutcome};
use terminus_plugins::search::SearchEngine;
use terminus_plugins::version;

#[derive(Parser)]
#[command(name = "terminus-plugins")]
#[command(about = "Search well-known or custom Terminus plugin registries")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for plugins in well-known or custom registries
    #[command(alias = "find")]
    Search {
        /// One or more partial or complete plugin names
        #[arg(required = true)]
        names: Vec<String>,

        /// Network timeout per request in seconds (no timeout if omitted)
        #[arg(short = 't', long = "timeout", value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Manage plugin Git registries
    #[command(alias = "reg")]
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },

    /// Generate shell completion scripts
    #[command(hide = true)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum RegistryCommands {
    /// Add one or more plugin Git registries
    Add {
        /// URLs of plugin Git registries
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// List configured plugin registries
    List,

    /// Remove one or more plugin registries
    Remove {
        /// URLs of plugin Git registries
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands) -> TerminusResult<()> {
    match command {
        Commands::Search { names, timeout } => {
            let store = RegistryStore::from_env()?;
            let registries = store.list()?;
            if registries.is_empty() {
                println!("{} No plugin registries exist.", "❌".red());
                return Ok(());
            }

            let probe = ProbeClient::new(timeout.map(Duration::from_secs));
            let engine = SearchEngine::new(&probe, registries);

            let start = Instant::now();
            let plugins = engine.search(&names);
            let elapsed = start.elapsed().as_secs_f64();

            if plugins.is_empty() {
                println!("{} No plugins were found.", "→".cyan());
                return Ok(());
            }

            println!("{} The following plugins were found:\n", "→".cyan());
            let width = plugins
                .keys()
                .map(|location| location.len())
                .chain(["Location".len()])
                .max()
                .unwrap_or(0);
            println!(
                "  {}  {}",
                format!("{:<width$}", "Location").bold(),
                "Description".bold()
            );
            for (location, description) in &plugins {
                println!(
                    "  {}  {}",
                    format!("{:<width$}", location).yellow(),
                    description
                );
            }

            let count = plugins.len();
            let plural = if count > 1 { "s" } else { "" };
            println!(
                "\n{} Found {} plugin{} in {:.2} sec.",
                "✓".green(),
                count,
                plural,
                elapsed
            );
            Ok(())
        }

        Commands::Registry { command } => {
            let store = RegistryStore::from_env()?;
            match command {
                RegistryCommands::Add { urls } => {
                    for url in urls {
                        match store.add(&url)? {
                            AddOutcome::Added => {
                                println!(
                                    "{} Plugin registry was added successfully.",
                                    "✓".green()
                                );
                            }
                            AddOutcome::AlreadyExists => {
                                println!("{} Registry {} already added.", "❌".red(), url);
                            }
                            AddOutcome::MissingNamespace => {
                                println!(
                                    "{} Registry {} must include an organization path (e.g. https://github.com/example-org).",
                                    "❌".red(),
                                    url
                                );
                            }
                        }
                    }
                    Ok(())
                }

                RegistryCommands::List => {
                    let registries = store.list()?;
                    if registries.is_empty() {
                        println!("{} No plugin registries exist.", "❌".red());
                        return Ok(());
                    }

                    println!(
                        "{} Plugin registries are stored in {}.",
                        "→".cyan(),
                        store.registries_path().display()
                    );
                    println!(
                        "{} The following plugin registries are available:",
                        "→".cyan()
                    );
                    for registry in &registries {
                        println!("  {}", registry.yellow());
                    }
                    println!(
                        "{} The 'search' command will only search in these registries.",
                        "→".cyan()
                    );
                    Ok(())
                }

                RegistryCommands::Remove { urls } => {
                    for url in urls {
                        match store.remove(&url)? {
                            RemoveOutcome::Removed => {
                                println!(
                                    "{} Plugin registry was removed successfully.",
                                    "✓".green()
                                );
                            }
                            RemoveOutcome::NotFound => {
                                println!("{} Registry {} does not exist.", "❌".red(), url);
                            }
                        }
                    }
                    Ok(())
                }
            }
        }

        Commands::Completion { shell } => {
            // Hidden command used by install scripts for completion setup
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }

        Commands::Version => {
            version::print_version_info();
            Ok(())
        }
    }
}
