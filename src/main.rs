//! # Van Directory CLI (`vandir`)
//!
//! The `vandir` binary manages the builder directory: store setup, record
//! CRUD, attribute and proximity search, map marker placement, import and
//! export, consistency checks, backup restore, and the REST server.
//!
//! ## Usage
//!
//! ```bash
//! vandir --config ./config/vandir.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `vandir init` | Create the backing store |
//! | `vandir add <file>` | Add a builder from a JSON file |
//! | `vandir get <id>` | Show one builder |
//! | `vandir update <id> <file>` | Apply a JSON patch file |
//! | `vandir remove <id>` | Delete a builder |
//! | `vandir search` | Attribute search |
//! | `vandir near` | Proximity search |
//! | `vandir resolve <city> <state>` | Resolve a place to coordinates |
//! | `vandir markers` | Map marker placements |
//! | `vandir validate` | Consistency report (`--repair` rebuilds the state index) |
//! | `vandir stats` | Totals and per-state counts |
//! | `vandir import <file>` | Bulk import |
//! | `vandir export` | Write the directory as JSON |
//! | `vandir restore` | Restore the newest backup |
//! | `vandir serve` | Start the REST server |

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use van_directory::{
    backend, config, export, get, import, locate, records, search, server, stats,
};
use van_directory_core::models::SearchQuery;
use van_directory_core::proximity::OriginSpec;

/// Van Directory CLI: search, map, and maintain a directory of camper-van
/// conversion builders.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/vandir.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "vandir",
    about = "Van Directory: a directory of camper-van conversion builders",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/vandir.toml`. A missing file at the default
    /// path means built-in defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

const DEFAULT_CONFIG: &str = "./config/vandir.toml";

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the backing store.
    ///
    /// Writes an empty document (JSON backend) or creates the database
    /// schema (SQLite backend). Safe to run repeatedly.
    Init,

    /// Add a builder from a JSON file. Prints the assigned id.
    Add {
        /// Path to a JSON file holding one builder record.
        file: PathBuf,
    },

    /// Show one builder.
    Get {
        /// Builder id.
        id: String,
    },

    /// Apply a partial update from a JSON file.
    Update {
        /// Builder id.
        id: String,
        /// Path to a JSON file holding the fields to change.
        file: PathBuf,
    },

    /// Delete a builder.
    Remove {
        /// Builder id.
        id: String,
    },

    /// Search by attributes. All given filters must match.
    Search(SearchArgs),

    /// Find builders within a radius of a point, zip code, or city.
    Near(NearArgs),

    /// Resolve a city and state to coordinates.
    Resolve {
        city: String,
        state: String,
    },

    /// Print map marker placements.
    Markers {
        /// Only builders in this state (name or two-letter code).
        #[arg(long)]
        state: Option<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Check id uniqueness, index consistency, and required fields.
    Validate {
        /// Rebuild the per-state index from the builder list first.
        #[arg(long)]
        repair: bool,
    },

    /// Show totals and per-state counts.
    Stats,

    /// Import builders from a JSON array or `{"builders": [...]}` document.
    ///
    /// Existing ids are skipped; records missing required fields are
    /// reported and skipped. The rest are stored in one write.
    Import {
        file: PathBuf,
    },

    /// Write the directory as JSON.
    Export {
        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Restore the newest backup.
    Restore,

    /// Start the REST server on `[server].bind`.
    Serve,
}

#[derive(Args)]
struct SearchArgs {
    /// Name contains (case-insensitive).
    #[arg(long)]
    name: Option<String>,
    /// State name or two-letter code.
    #[arg(long)]
    state: Option<String>,
    /// City contains (case-insensitive).
    #[arg(long)]
    city: Option<String>,
    /// Offers a service containing this text.
    #[arg(long)]
    service: Option<String>,
    /// Works on a van type containing this text.
    #[arg(long)]
    van_type: Option<String>,
    /// Maximum number of results (defaults to `search.default_limit`).
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct NearArgs {
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    zip: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    /// Radius in miles. Defaults to `search.zip_radius_miles` for zip
    /// queries and `search.default_radius_miles` otherwise.
    #[arg(long)]
    radius: Option<f64>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "van_directory=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // The default path is optional; an explicit --config must exist.
    let cfg = if cli.config == PathBuf::from(DEFAULT_CONFIG) && !cli.config.exists() {
        tracing::debug!("no config at {}, using defaults", DEFAULT_CONFIG);
        config::parse_config("")?
    } else {
        config::load_config(&cli.config)?
    };

    match cli.command {
        Commands::Init => {
            backend::init_store(&cfg).await?;
            println!("Store initialized at {}.", cfg.store.path.display());
        }
        Commands::Add { file } => {
            records::run_add(&cfg, &file).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Update { id, file } => {
            records::run_update(&cfg, &id, &file).await?;
        }
        Commands::Remove { id } => {
            records::run_remove(&cfg, &id).await?;
        }
        Commands::Search(args) => {
            let query = SearchQuery {
                name: args.name,
                state: args.state,
                city: args.city,
                service: args.service,
                van_type: args.van_type,
                limit: args.limit,
            };
            search::run_search(&cfg, query).await?;
        }
        Commands::Near(args) => {
            let query = OriginSpec {
                lat: args.lat,
                lng: args.lng,
                zip: args.zip,
                city: args.city,
                state: args.state,
            };
            search::run_near(&cfg, query, args.radius).await?;
        }
        Commands::Resolve { city, state } => {
            locate::run_resolve(&cfg, &city, &state).await?;
        }
        Commands::Markers { state, json } => {
            locate::run_markers(&cfg, state.as_deref(), json).await?;
        }
        Commands::Validate { repair } => {
            records::run_validate(&cfg, repair).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Import { file } => {
            import::run_import(&cfg, &file).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Restore => {
            records::run_restore(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
