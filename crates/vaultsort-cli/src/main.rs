use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vaultsort_core::{Config, FileStorage, VaultOrganizer};

#[derive(Parser)]
#[command(name = "vaultsort")]
#[command(about = "Organize an Obsidian vault based on tags", long_about = None)]
struct Cli {
    /// Config file (TOML, or YAML with a .yaml/.yml extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Leave dot-files and dot-directories (e.g. `.obsidian/`) out of the walk
    #[arg(long, global = true)]
    skip_hidden: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Retag, move and index every note in the vault (default)
    Organize,
    /// Show where a single note would go, without changing anything
    Classify {
        /// Path to the note
        note: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the configuration
    Check,
    /// Print a default configuration file
    Init,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, vaultsort_core::ConfigError> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    debug!(
        vault = %config.vault_root.display(),
        categories = config.category_rules.len(),
        "loaded configuration"
    );
    Ok(config)
}

fn storage_for(config: &Config, skip_hidden: bool) -> FileStorage {
    FileStorage::new().skip_hidden(skip_hidden || config.skip_hidden)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Commands::Organize) {
        Commands::Organize => {
            let config = load_config(cli.config.as_ref())?;
            let organizer = VaultOrganizer::new(&config, storage_for(&config, cli.skip_hidden));
            let report = organizer.organize()?;
            println!("{}", report);
        }
        Commands::Classify { note, json } => {
            let config = load_config(cli.config.as_ref())?;
            let organizer = VaultOrganizer::new(&config, storage_for(&config, cli.skip_hidden));
            let classification = organizer.classify_note(&note)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&classification)?);
            } else {
                println!("Note:        {}", note.display());
                println!("Main folder: {}", classification.main_folder);
                println!(
                    "Subfolder:   {}",
                    classification.subfolder.as_deref().unwrap_or("-")
                );
                println!("Tags:        {}", classification.tags.join(", "));
            }
        }
        Commands::Check => {
            let config = load_config(cli.config.as_ref())?;
            let warnings = config.validate()?;
            if warnings.is_empty() {
                println!("Configuration OK");
            } else {
                for warning in &warnings {
                    println!("warning: {}", warning);
                }
                println!("{} warning(s)", warnings.len());
            }
        }
        Commands::Init => {
            print!("{}", Config::default_config_string()?);
        }
    }

    Ok(())
}
