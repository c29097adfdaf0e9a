//! JSON catalog import
//!
//! Walks a directory for `*.json` catalog fragments and writes them into the
//! database. Each fragment may carry any of:
//!
//! ```json
//! {
//!   "types": [{ "typeID": 34, "name": "Tritanium", "group": "Mineral" }],
//!   "typeSchemes": { "587": 1 },
//!   "schemes": [{
//!     "schemeID": 1,
//!     "type": "manufacturing",
//!     "materials": [{ "typeID": 34, "quantity": 32000 }],
//!     "products": [{ "typeID": 587, "quantity": 1 }]
//!   }]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::Connection;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::db;
use crate::models::{ItemDesc, Recipe, SchemeId, TypeId};

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");

#[derive(Debug, Deserialize)]
struct SchemeEntry {
    #[serde(rename = "schemeID")]
    scheme_id: SchemeId,
    #[serde(flatten)]
    recipe: Recipe,
}

/// One catalog fragment as found on disk
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
    #[serde(default)]
    types: Vec<ItemDesc>,
    #[serde(default)]
    type_schemes: BTreeMap<TypeId, SchemeId>,
    #[serde(default)]
    schemes: Vec<SchemeEntry>,
}

impl CatalogFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Find all JSON files below `dir`, in path order
pub fn find_catalog_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Write one fragment into the database
pub fn import_file(conn: &Connection, file: &CatalogFile) -> Result<ImportStats> {
    let tx = conn.unchecked_transaction()?;

    for item in &file.types {
        db::upsert_type(&tx, item)?;
    }
    for entry in &file.schemes {
        db::upsert_scheme(&tx, entry.scheme_id, &entry.recipe)?;
    }
    for (type_id, scheme_id) in &file.type_schemes {
        db::assign_scheme(&tx, *type_id, *scheme_id)?;
    }

    tx.commit()?;

    Ok(ImportStats {
        files: 1,
        types: file.types.len(),
        schemes: file.schemes.len(),
        assignments: file.type_schemes.len(),
        errors: 0,
    })
}

/// Import every fragment below `dir`; unreadable fragments are counted and skipped
pub fn import_directory(conn: &Connection, dir: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    info!("scanning {} for catalog files", dir.display());
    let files = find_catalog_files(dir);
    info!("found {} catalog files", files.len());

    for path in &files {
        match CatalogFile::read(path) {
            Ok(file) => {
                stats += import_file(conn, &file)?;
                info!(
                    "imported {}: {} types, {} schemes",
                    path.display(),
                    file.types.len(),
                    file.schemes.len()
                );
            }
            Err(e) => {
                warn!("skipping {}: {:#}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

/// Load the bundled sample catalog, replacing existing data
pub fn load_sample(conn: &Connection) -> Result<ImportStats> {
    db::clear_catalog(conn)?;
    let file = CatalogFile::parse(SAMPLE_CATALOG).context("bundled sample catalog is malformed")?;
    import_file(conn, &file)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub files: usize,
    pub types: usize,
    pub schemes: usize,
    pub assignments: usize,
    pub errors: usize,
}

impl std::ops::AddAssign for ImportStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.types += other.types;
        self.schemes += other.schemes;
        self.assignments += other.assignments;
        self.errors += other.errors;
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} files ({} types, {} schemes, {} producible types). Errors: {}",
            self.files, self.types, self.schemes, self.assignments, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fragment_with_missing_sections() {
        let file = CatalogFile::parse(r#"{"typeSchemes": {"587": 1}}"#).unwrap();
        assert!(file.types.is_empty());
        assert_eq!(file.type_schemes.get(&TypeId(587)), Some(&SchemeId(1)));
    }

    #[test]
    fn sample_catalog_is_valid() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let stats = load_sample(&conn).unwrap();
        assert!(stats.schemes > 0);

        let catalog = db::load_catalog(&conn).unwrap();
        assert_eq!(catalog.producible_count(), stats.assignments);
        assert_eq!(catalog.name(TypeId(587)), Some("Rifter"));
    }
}
