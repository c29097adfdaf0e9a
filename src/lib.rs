//! Industry Tree
//!
//! Expands an EVE Online item into the full tree of materials needed to build
//! it, following manufacturing, reaction and planetary recipes down to base
//! materials. Trees can be partially collapsed, laid out for a graph view and
//! summed into a shopping list.
//!
//! ```no_run
//! use industry_tree::{MaterialTree, Settings, TypeId, db, get_base_materials};
//!
//! # fn main() -> anyhow::Result<()> {
//! let conn = rusqlite::Connection::open("eve_industry.db")?;
//! let catalog = db::load_catalog(&conn)?;
//! let settings = Settings::default();
//!
//! let tree = MaterialTree::build(&catalog, TypeId(587), 10, &settings, settings.toggles());
//! let totals = get_base_materials(&tree, false);
//! print!("{}", totals.to_multibuy(&catalog));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod catalog;
pub mod db;
pub mod error;
pub mod format;
pub mod import;
pub mod layout;
pub mod models;
pub mod report;
pub mod search;
pub mod settings;
pub mod tree;

pub use aggregate::{BaseMaterials, get_base_materials};
pub use catalog::RecipeCatalog;
pub use error::{CatalogError, SettingsError};
pub use layout::{compute_node_positions, generate_connections, generate_display_nodes};
pub use models::{
    DisplayKind, DisplayNode, Edge, ItemDesc, Margin, Material, NodeId, NodeState, Position,
    ProductionType, Recipe, SchemeId, Toggles, TypeId,
};
pub use settings::Settings;
pub use tree::{MaterialEfficiency, MaterialTree, NoEfficiency, NodeRef, required_quantity};
