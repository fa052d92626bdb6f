//! sealnote - Passphrase-protected note store
//!
//! Usage:
//!   sealnote list                     - Show the index
//!   sealnote add <name>               - Create an entry
//!   sealnote show <target>            - Print an entry
//!   sealnote edit <target>            - Replace an entry's text
//!   sealnote rename <target> <name>   - Rename an entry
//!   sealnote up|down <target>         - Reorder an entry
//!   sealnote rm <target>              - Delete an entry
//!   sealnote import <file>            - Create an entry from a file
//!   sealnote export <target> [file]   - Write an entry to a file

use clap::{Parser, Subcommand};
use sealnote::{
    store::{Index, Storage},
    transfer, Config, Error, Result,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "sealnote")]
#[command(author = "sealnote Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Passphrase-protected note store")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store path (overrides the configuration)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Read the passphrase from a file
    #[arg(long)]
    password_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the index
    List,

    /// Create an entry
    Add {
        /// Entry name
        name: String,

        /// Entry text (read from stdin if neither --text nor --file is given)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read entry text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print an entry
    Show {
        /// Entry id or index position
        target: String,
    },

    /// Replace an entry's text
    Edit {
        /// Entry id or index position
        target: String,

        /// New text (read from stdin if neither --text nor --file is given)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read new text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Rename an entry
    Rename {
        /// Entry id or index position
        target: String,

        /// New name
        name: String,
    },

    /// Move an entry one place up
    Up {
        /// Entry id or index position
        target: String,
    },

    /// Move an entry one place down
    Down {
        /// Entry id or index position
        target: String,
    },

    /// Delete an entry
    Rm {
        /// Entry id or index position
        target: String,
    },

    /// Create an entry from a text file
    Import {
        /// File to read
        file: PathBuf,
    },

    /// Write an entry's text to a new file
    Export {
        /// Entry id or index position
        target: String,

        /// Destination (defaults to a name derived from the entry)
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.kind().exit_code());
        }
    };
    if let Some(store) = &cli.store {
        config.store.path = store.clone();
    }

    // Setup logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, &config) {
        debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(e.kind().exit_code());
    }
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let passphrase = read_passphrase(&config.store.path, cli.password_file.as_deref())?;

    config.ensure_directories()?;
    let storage = Storage::open_with_config(&config.store, &passphrase)?;

    let result = run_command(cli.command, &storage, config);
    let closed = storage.close();
    result.and(closed)
}

fn run_command(command: Commands, storage: &Storage, config: &Config) -> Result<()> {
    match command {
        Commands::List => cmd_list(storage),

        Commands::Add { name, text, file } => {
            let text = read_text(text, file)?;
            let (entry, _) = storage.create(&name, &text)?;
            println!("{}", entry.id);
            Ok(())
        }

        Commands::Show { target } => {
            let id = resolve_target(storage, &target)?;
            print!("{}", storage.read(id)?);
            Ok(())
        }

        Commands::Edit { target, text, file } => {
            let id = resolve_target(storage, &target)?;
            let mut entry = storage.read(id)?;
            entry.text = read_text(text, file)?;
            storage.update(&entry)
        }

        Commands::Rename { target, name } => {
            let id = resolve_target(storage, &target)?;
            print_index(&storage.rename(id, &name)?);
            Ok(())
        }

        Commands::Up { target } => {
            let id = resolve_target(storage, &target)?;
            print_index(&storage.move_up(id)?);
            Ok(())
        }

        Commands::Down { target } => {
            let id = resolve_target(storage, &target)?;
            print_index(&storage.move_down(id)?);
            Ok(())
        }

        Commands::Rm { target } => {
            let id = resolve_target(storage, &target)?;
            print_index(&storage.delete(id)?);
            Ok(())
        }

        Commands::Import { file } => {
            let (entry, _) =
                transfer::import_file(storage, &file, config.transfer.import_size_limit)?;
            println!("{}", entry.id);
            Ok(())
        }

        Commands::Export { target, file } => {
            let id = resolve_target(storage, &target)?;
            let path = match file {
                Some(path) => path,
                None => {
                    let name = storage
                        .index()?
                        .iter()
                        .find(|meta| meta.id == id)
                        .map(|meta| meta.name.clone())
                        .ok_or(Error::NotFound(id))?;
                    PathBuf::from(transfer::export_file_name(&name))
                }
            };
            transfer::export_entry(storage, id, &path)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn cmd_list(storage: &Storage) -> Result<()> {
    let index = storage.index()?;
    if index.is_empty() {
        println!("No entries");
        return Ok(());
    }

    for (i, meta) in index.iter().enumerate() {
        let created = meta
            .created_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:03}  {}  {}  {}", i, meta.id, created, meta.name);
    }
    Ok(())
}

fn print_index(index: &Index) {
    if !index.is_empty() {
        println!("{}", index);
    }
}

/// Accept either an entry id or a zero-based index position
fn resolve_target(storage: &Storage, target: &str) -> Result<Uuid> {
    storage.index()?.resolve(target)
}

fn read_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Collect the passphrase, asking twice when the store is new
fn read_passphrase(store_path: &Path, password_file: Option<&Path>) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(path) = password_file {
        let content = Zeroizing::new(std::fs::read_to_string(path)?);
        return Ok(Zeroizing::new(content.trim_end_matches(['\r', '\n']).as_bytes().to_vec()));
    }

    let name = store_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| store_path.display().to_string());

    eprintln!("SECURITY NOTE: the key and the open note stay unencrypted in memory.");
    let first = Zeroizing::new(rpassword::prompt_password(format!(
        "Enter passphrase for {}> ",
        name
    ))?);

    if !Storage::exists(store_path) {
        info!("No store at {:?}, creating a new one", store_path);
        eprintln!("This is a new store. Please repeat the passphrase.");
        let again = Zeroizing::new(rpassword::prompt_password(format!(
            "Enter passphrase for {}> ",
            name
        ))?);
        if *first != *again {
            return Err(Error::Configuration("Passphrases did not match".to_string()));
        }
    }

    Ok(Zeroizing::new(first.as_bytes().to_vec()))
}
