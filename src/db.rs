//! Database schema and operations for the recipe catalog

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use log::info;
use rusqlite::{Connection, OptionalExtension};

use crate::catalog::RecipeCatalog;
use crate::models::{ItemDesc, Material, ProductionType, Recipe, SchemeId, TypeId};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Item descriptions
        CREATE TABLE IF NOT EXISTS types (
            type_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            group_name TEXT
        );

        -- Production schemes (blueprints, reaction formulas, PI schematics)
        CREATE TABLE IF NOT EXISTS schemes (
            scheme_id INTEGER PRIMARY KEY,
            production_type TEXT NOT NULL
        );

        -- Which scheme produces each craftable type
        CREATE TABLE IF NOT EXISTS type_schemes (
            type_id INTEGER PRIMARY KEY,
            scheme_id INTEGER NOT NULL
        );

        -- Scheme inputs, in recipe order
        CREATE TABLE IF NOT EXISTS scheme_materials (
            scheme_id INTEGER,
            position INTEGER,
            type_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (scheme_id, position)
        );

        -- Scheme outputs; position 0 is the primary product
        CREATE TABLE IF NOT EXISTS scheme_products (
            scheme_id INTEGER,
            position INTEGER,
            type_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (scheme_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_types_name ON types(name COLLATE NOCASE);
        "#,
    )?;
    Ok(())
}

/// Clear all catalog data (for re-import)
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM scheme_products;
        DELETE FROM scheme_materials;
        DELETE FROM type_schemes;
        DELETE FROM schemes;
        DELETE FROM types;
        "#,
    )?;
    Ok(())
}

/// Insert or replace an item description
pub fn upsert_type(conn: &Connection, item: &ItemDesc) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO types (type_id, name, group_name) VALUES (?1, ?2, ?3)",
        (item.type_id.0, &item.name, &item.group),
    )?;
    Ok(())
}

fn insert_materials(conn: &Connection, table: &str, scheme_id: SchemeId, materials: &[Material]) -> Result<()> {
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {table} (scheme_id, position, type_id, quantity) VALUES (?1, ?2, ?3, ?4)"
    ))?;
    for (position, material) in materials.iter().enumerate() {
        let quantity = i64::try_from(material.quantity)
            .with_context(|| format!("quantity {} out of range", material.quantity))?;
        stmt.execute((scheme_id.0, position as i64, material.type_id.0, quantity))?;
    }
    Ok(())
}

/// Insert or replace a scheme together with its materials and products
pub fn upsert_scheme(conn: &Connection, scheme_id: SchemeId, recipe: &Recipe) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schemes (scheme_id, production_type) VALUES (?1, ?2)",
        (scheme_id.0, recipe.production_type.as_str()),
    )?;
    conn.execute("DELETE FROM scheme_materials WHERE scheme_id = ?1", [scheme_id.0])?;
    conn.execute("DELETE FROM scheme_products WHERE scheme_id = ?1", [scheme_id.0])?;
    insert_materials(conn, "scheme_materials", scheme_id, &recipe.materials)?;
    insert_materials(conn, "scheme_products", scheme_id, &recipe.products)?;
    Ok(())
}

/// Record that `type_id` is produced by `scheme_id`
pub fn assign_scheme(conn: &Connection, type_id: TypeId, scheme_id: SchemeId) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO type_schemes (type_id, scheme_id) VALUES (?1, ?2)",
        (type_id.0, scheme_id.0),
    )?;
    Ok(())
}

fn load_materials(conn: &Connection, table: &str) -> Result<HashMap<SchemeId, Vec<Material>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT scheme_id, type_id, quantity FROM {table} ORDER BY scheme_id, position"
    ))?;

    let rows = stmt.query_map([], |row| {
        Ok((
            SchemeId(row.get(0)?),
            TypeId(row.get(1)?),
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut results: HashMap<SchemeId, Vec<Material>> = HashMap::new();
    for row in rows {
        let (scheme_id, type_id, quantity) = row?;
        let quantity = u64::try_from(quantity)
            .with_context(|| format!("negative quantity in {table} for scheme {scheme_id}"))?;
        results
            .entry(scheme_id)
            .or_default()
            .push(Material::new(type_id, quantity));
    }
    Ok(results)
}

/// Load the whole catalog into memory
pub fn load_catalog(conn: &Connection) -> Result<RecipeCatalog> {
    let mut materials = load_materials(conn, "scheme_materials")?;
    let mut products = load_materials(conn, "scheme_products")?;

    let mut stmt = conn.prepare("SELECT scheme_id, production_type FROM schemes")?;
    let rows = stmt.query_map([], |row| Ok((SchemeId(row.get(0)?), row.get::<_, String>(1)?)))?;

    let mut schemes = HashMap::new();
    for row in rows {
        let (scheme_id, production_type) = row?;
        let production_type: ProductionType = production_type
            .parse()
            .with_context(|| format!("scheme {scheme_id}"))?;
        schemes.insert(
            scheme_id,
            Recipe {
                materials: materials.remove(&scheme_id).unwrap_or_default(),
                products: products.remove(&scheme_id).unwrap_or_default(),
                production_type,
            },
        );
    }

    let mut stmt = conn.prepare("SELECT type_id, scheme_id FROM type_schemes")?;
    let rows = stmt.query_map([], |row| Ok((TypeId(row.get(0)?), SchemeId(row.get(1)?))))?;
    let mut type_schemes = HashMap::new();
    for row in rows {
        let (type_id, scheme_id) = row?;
        type_schemes.insert(type_id, scheme_id);
    }

    let catalog = RecipeCatalog::new(type_schemes, schemes, list_types(conn)?)
        .context("recipe catalog failed validation")?;
    info!(
        "loaded catalog: {} schemes, {} craftable types",
        catalog.scheme_count(),
        catalog.producible_count()
    );
    Ok(catalog)
}

/// List all item descriptions, ordered by name
pub fn list_types(conn: &Connection) -> Result<Vec<ItemDesc>> {
    let mut stmt = conn.prepare("SELECT type_id, name, group_name FROM types ORDER BY name")?;

    let rows = stmt.query_map([], |row| {
        Ok(ItemDesc {
            type_id: TypeId(row.get(0)?),
            name: row.get(1)?,
            group: row.get(2)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Find a type by exact name, ignoring case
pub fn find_type_by_name(conn: &Connection, name: &str) -> Result<Option<TypeId>> {
    let type_id = conn
        .query_row(
            "SELECT type_id FROM types WHERE name = ?1 COLLATE NOCASE",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(type_id.map(TypeId))
}

pub fn find_type_name(conn: &Connection, type_id: TypeId) -> Result<Option<String>> {
    let name = conn
        .query_row("SELECT name FROM types WHERE type_id = ?1", [type_id.0], |row| row.get(0))
        .optional()?;
    Ok(name)
}

/// Resolve a command-line item argument: a numeric type id or an item name
pub fn resolve_item(conn: &Connection, item: &str) -> Result<TypeId> {
    if let Ok(id) = item.trim().parse::<u32>() {
        return Ok(TypeId(id));
    }
    find_type_by_name(conn, item.trim())?
        .ok_or_else(|| anyhow!("no item named '{}' (try the search command)", item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn plate_recipe() -> Recipe {
        Recipe {
            materials: vec![Material::new(TypeId(16670), 22), Material::new(TypeId(11478), 1)],
            products: vec![Material::new(TypeId(11543), 1)],
            production_type: ProductionType::Manufacturing,
        }
    }

    #[test]
    fn catalog_round_trips_in_material_order() {
        let conn = memory_db();
        upsert_scheme(&conn, SchemeId(7), &plate_recipe()).unwrap();
        assign_scheme(&conn, TypeId(11543), SchemeId(7)).unwrap();

        let catalog = load_catalog(&conn).unwrap();
        assert_eq!(catalog.recipe(TypeId(11543)), Some(&plate_recipe()));
        assert_eq!(catalog.recipe(TypeId(16670)), None);
    }

    #[test]
    fn upsert_replaces_previous_materials() {
        let conn = memory_db();
        upsert_scheme(&conn, SchemeId(7), &plate_recipe()).unwrap();
        let mut smaller = plate_recipe();
        smaller.materials.truncate(1);
        upsert_scheme(&conn, SchemeId(7), &smaller).unwrap();
        assign_scheme(&conn, TypeId(11543), SchemeId(7)).unwrap();

        let catalog = load_catalog(&conn).unwrap();
        assert_eq!(catalog.recipe(TypeId(11543)).unwrap().materials.len(), 1);
    }

    #[test]
    fn invalid_catalog_is_reported() {
        let conn = memory_db();
        assign_scheme(&conn, TypeId(11543), SchemeId(99)).unwrap();
        assert!(load_catalog(&conn).is_err());
    }

    #[test]
    fn resolves_ids_and_names() {
        let conn = memory_db();
        upsert_type(
            &conn,
            &ItemDesc {
                type_id: TypeId(34),
                name: "Tritanium".to_string(),
                group: Some("Mineral".to_string()),
            },
        )
        .unwrap();

        assert_eq!(resolve_item(&conn, "34").unwrap(), TypeId(34));
        assert_eq!(resolve_item(&conn, "tritanium").unwrap(), TypeId(34));
        assert_eq!(find_type_name(&conn, TypeId(34)).unwrap().as_deref(), Some("Tritanium"));
        assert_eq!(find_type_name(&conn, TypeId(35)).unwrap(), None);
        assert!(resolve_item(&conn, "Veldspar").is_err());
    }
}
