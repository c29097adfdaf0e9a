//! Industry Tree
//!
//! Command-line browser for EVE Online production trees.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use rusqlite::Connection;
use serde::Serialize;

use industry_tree::models::{DisplayNode, Edge, Margin, NodeId, Toggles, TypeId};
use industry_tree::{MaterialTree, RecipeCatalog, Settings, db, import, layout, report, search};

#[derive(Parser)]
#[command(name = "industry-tree")]
#[command(about = "Production tree browser for EVE Online industry")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, global = true, default_value = "eve_industry.db")]
    database: PathBuf,

    /// Path to the settings file
    #[arg(short, long, global = true, default_value = "settings-config.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load the bundled sample catalog
    LoadSample,

    /// Import JSON catalog files from a directory
    Import {
        /// Directory searched recursively for *.json files
        source_dir: PathBuf,

        /// Clear existing data before import
        #[arg(long)]
        clear: bool,
    },

    /// Search items by name
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Print the production tree of an item
    Tree {
        /// Type id or item name
        item: String,

        /// Units to produce
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        runs: u64,

        /// Flip the collapse state of a node id (repeatable)
        #[arg(short, long = "toggle")]
        toggles: Vec<u32>,
    },

    /// Total base materials for an item, as a multibuy list
    Materials {
        /// Type id or item name
        item: String,

        /// Units to produce
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        runs: u64,

        /// Count collapsed items as purchased instead of their inputs
        #[arg(long)]
        collapsed_as_leaf: bool,

        /// Print only the multibuy lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the graph layout of an item's tree as JSON
    Layout {
        /// Type id or item name
        item: String,

        /// Units to produce
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
        runs: u64,

        /// Padding around each node box
        #[arg(short, long, default_value = "40")]
        margin: f64,

        /// Flip the collapse state of a node id (repeatable)
        #[arg(short, long = "toggle")]
        toggles: Vec<u32>,
    },

    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Set the material efficiency percentage (0-10) for an item
    SetEfficiency {
        /// Type id or item name
        item: String,
        percent: f64,
    },

    /// Remove the material efficiency override for an item
    ClearEfficiency {
        /// Type id or item name
        item: String,
    },

    /// Set one of the six collapse toggles
    SetToggle {
        /// 0 manufacturing, 1 reaction, 2 pi, 3 fuel blocks, 4 R.A.M., 5 first row only
        index: usize,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

const TOGGLE_NAMES: [&str; Toggles::COUNT] = [
    "collapse manufacturing",
    "collapse reactions",
    "collapse planetary industry",
    "collapse fuel blocks",
    "collapse R.A.M.",
    "first row only",
];

#[derive(Serialize)]
struct GraphLayout {
    nodes: Vec<DisplayNode>,
    edges: Vec<Edge>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let stats = import::load_sample(&conn)?;
            println!("Sample data loaded successfully!");
            println!("{}", stats);
        }

        Commands::Import { source_dir, clear } => {
            if clear {
                println!("Clearing existing data...");
                db::clear_catalog(&conn)?;
            }

            let stats = import::import_directory(&conn, &source_dir)?;
            println!("\n{}", stats);
        }

        Commands::Search { query, limit } => {
            let catalog = db::load_catalog(&conn)?;
            let hits = search::search(catalog.items(), &query, limit);
            if hits.is_empty() {
                println!("No items match '{}'.", query);
            } else {
                println!("{:>8}  {:<40} {}", "Type ID", "Name", "Group");
                println!("{}", "-".repeat(70));
                for item in hits {
                    println!(
                        "{:>8}  {:<40} {}",
                        item.type_id,
                        item.name,
                        item.group.as_deref().unwrap_or("")
                    );
                }
            }
        }

        Commands::Tree { item, runs, toggles } => {
            let catalog = load_catalog(&conn)?;
            let settings = Settings::load_or_default(&cli.settings)?;
            let type_id = db::resolve_item(&conn, &item)?;

            let tree = build_tree(&catalog, &settings, type_id, runs, &toggles);
            print!("{}", report::format_tree(&tree, &catalog));
        }

        Commands::Materials {
            item,
            runs,
            collapsed_as_leaf,
            quiet,
        } => {
            let catalog = load_catalog(&conn)?;
            let settings = Settings::load_or_default(&cli.settings)?;
            let type_id = db::resolve_item(&conn, &item)?;

            let tree = build_tree(&catalog, &settings, type_id, runs, &[]);
            let (summary, totals) =
                report::summarize_materials(&tree, &catalog, type_id, runs, collapsed_as_leaf);

            if !quiet {
                println!("{}", summary);
                println!("Multibuy:");
            }
            print!("{}", totals.to_multibuy(&catalog));
        }

        Commands::Layout {
            item,
            runs,
            margin,
            toggles,
        } => {
            let catalog = load_catalog(&conn)?;
            let settings = Settings::load_or_default(&cli.settings)?;
            let type_id = db::resolve_item(&conn, &item)?;

            let tree = build_tree(&catalog, &settings, type_id, runs, &toggles);
            let margin = Margin::uniform(margin);
            let graph = GraphLayout {
                nodes: layout::generate_display_nodes(&tree, margin),
                edges: layout::generate_connections(&tree),
            };
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }

        Commands::Settings { command } => run_settings(&conn, &cli.settings, command)?,
    }

    Ok(())
}

fn load_catalog(conn: &Connection) -> Result<RecipeCatalog> {
    let catalog = db::load_catalog(conn)?;
    if catalog.producible_count() == 0 {
        println!("No recipes in database. Run 'import' or 'load-sample' first.");
    }
    Ok(catalog)
}

/// Build with the persisted toggles, then flip each requested node in order
fn build_tree(
    catalog: &RecipeCatalog,
    settings: &Settings,
    type_id: TypeId,
    runs: u64,
    toggles: &[u32],
) -> MaterialTree {
    let tree = MaterialTree::build(catalog, type_id, runs, settings, settings.toggles());
    toggles.iter().fold(tree, |tree, &id| {
        debug!("toggling node {id}");
        tree.toggle_node(NodeId(id))
    })
}

fn run_settings(conn: &Connection, path: &Path, command: SettingsCommand) -> Result<()> {
    let mut settings = Settings::load_or_default(path)?;

    match command {
        SettingsCommand::Show => {
            println!("Settings: {}", path.display());
            println!();
            println!("Toggles:");
            for (index, (name, value)) in TOGGLE_NAMES
                .iter()
                .zip(settings.toggles().to_array())
                .enumerate()
            {
                println!("  [{}] {:<30} {}", index, name, if value { "on" } else { "off" });
            }

            println!();
            println!("Material efficiency:");
            let mut any = false;
            for (type_id, percent) in settings.material_efficiencies() {
                let name = db::find_type_name(conn, type_id)?.unwrap_or_else(|| type_id.to_string());
                println!("  {:<40} {}%", name, percent);
                any = true;
            }
            if !any {
                println!("  (none)");
            }
            return Ok(());
        }

        SettingsCommand::SetEfficiency { item, percent } => {
            let type_id = db::resolve_item(conn, &item)?;
            let stored = settings.set_material_efficiency(type_id, percent);
            println!("Material efficiency for {} set to {}%", item, stored);
        }

        SettingsCommand::ClearEfficiency { item } => {
            let type_id = db::resolve_item(conn, &item)?;
            if settings.clear_material_efficiency(type_id) {
                println!("Material efficiency for {} cleared", item);
            } else {
                println!("No material efficiency set for {}", item);
            }
        }

        SettingsCommand::SetToggle { index, value } => {
            settings.set_toggle(index, value)?;
            println!("Toggle [{}] {} set to {}", index, TOGGLE_NAMES[index], value);
        }
    }

    settings.save(path)?;
    Ok(())
}
