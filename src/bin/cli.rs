//! arksave CLI
//!
//! Command-line interface for querying a save database or snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use arksave::store::{SaveStore, SnapshotWriter};
use arksave::{Config, NameId, Result, Session};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// arksave CLI
#[derive(Parser, Debug)]
#[command(name = "arksave-cli")]
#[command(about = "Extract creature records from ARK saves")]
#[command(version)]
struct Args {
    /// Save database (.ark)
    #[arg(short, long, default_value = "./data/TheIsland_WP.ark")]
    save: PathBuf,

    /// Read a snapshot file instead of the save database
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Decode worker threads
    #[arg(short, long, default_value = "1")]
    workers: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tamed creatures
    Query {
        /// Blueprint class (defaults to the Rex class)
        #[arg(short, long)]
        class: Option<String>,

        /// Scan every object instead of one class
        #[arg(long, conflicts_with = "class")]
        all: bool,
    },

    /// Resolve a name id given as hex bytes, as shown by a hex viewer
    Resolve {
        /// Four bytes of hex, e.g. 04425610
        hex: String,
    },

    /// Find the ids of a name
    Lookup {
        /// The name to look up
        name: String,
    },

    /// Write the raw blobs of a class to disk
    Dump {
        /// Blueprint class
        #[arg(short, long)]
        class: String,

        /// Output directory
        #[arg(short, long, default_value = "./data")]
        out: PathBuf,
    },

    /// Write the open save to a snapshot file
    Export {
        /// Snapshot file to create
        out: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,arksave=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("arksave v{}", arksave::VERSION);
    match &args.snapshot {
        Some(path) => tracing::info!("Snapshot: {}", path.display()),
        None => tracing::info!("Save: {}", args.save.display()),
    }

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut builder = Config::builder()
        .save_path(&args.save)
        .worker_threads(args.workers);
    if let Some(path) = &args.snapshot {
        builder = builder.snapshot_path(path);
    }
    let config = builder.build();

    match args.snapshot {
        Some(_) => execute(Session::open_snapshot(config)?, args.command),
        None => execute(Session::open_save(config)?, args.command),
    }
}

fn execute<S: SaveStore>(session: Session<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Query { class, all } => {
            let filter = if all {
                None
            } else {
                Some(class.unwrap_or_else(|| session.config().target_class.clone()))
            };
            let output = session.query(filter.as_deref())?;
            for record in output.records() {
                println!("{}", record);
                for diagnostic in &record.diagnostics {
                    println!("    note: {}", diagnostic);
                }
            }
            for diagnostic in &output.diagnostics {
                tracing::warn!("{}", diagnostic);
            }
        }
        Commands::Resolve { hex } => {
            let id = parse_blob_hex(&hex)?;
            println!("{}", session.resolve_name(id));
        }
        Commands::Lookup { name } => {
            let ids = session.names().reverse_lookup_all(&name);
            if ids.is_empty() {
                return Err(arksave::ArkError::NameNotFound(name));
            }
            for id in ids {
                println!("{} ({})", hex::encode(id.to_le_bytes()), id);
            }
        }
        Commands::Dump { class, out } => {
            let objects = session.objects_of_class(&class)?;
            let dir = out.join(class.trim_start_matches('/'));
            fs::create_dir_all(&dir)?;
            for object in &objects {
                write_blob(&dir, &object.key.simple(), &object.value)?;
            }
            println!("Wrote {} objects to {}", objects.len(), dir.display());
        }
        Commands::Export { out } => {
            let header_key = session.config().header_key.clone();
            let path = SnapshotWriter::import(&out, session.store(), &[header_key.as_str()])?;
            println!("Wrote snapshot {}", path.display());
        }
    }

    Ok(())
}

/// Hex bytes as they appear in a blob → name id
fn parse_blob_hex(text: &str) -> Result<NameId> {
    let bytes = hex::decode(text.trim())
        .map_err(|e| arksave::ArkError::Config(format!("invalid hex {:?}: {}", text, e)))?;
    let bytes: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
        arksave::ArkError::Config(format!("expected 4 bytes of hex, got {}", bytes.len()))
    })?;
    Ok(NameId(u32::from_le_bytes(bytes)))
}

fn write_blob(dir: &Path, name: &str, value: &[u8]) -> Result<()> {
    fs::write(dir.join(name), value)?;
    Ok(())
}
