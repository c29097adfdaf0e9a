//! In-memory recipe catalog
//!
//! Maps item types to the scheme that produces them, and schemes to their
//! recipes. A type with no scheme entry is a base material. The catalog is
//! validated once on construction so tree operations never see a recipe
//! without a usable primary product.

use std::collections::HashMap;

use crate::error::CatalogError;
use crate::models::{ItemDesc, Recipe, SchemeId, TypeId};

#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    type_schemes: HashMap<TypeId, SchemeId>,
    schemes: HashMap<SchemeId, Recipe>,
    items: HashMap<TypeId, ItemDesc>,
}

impl RecipeCatalog {
    pub fn new(
        type_schemes: HashMap<TypeId, SchemeId>,
        schemes: HashMap<SchemeId, Recipe>,
        items: impl IntoIterator<Item = ItemDesc>,
    ) -> Result<Self, CatalogError> {
        for (scheme_id, recipe) in &schemes {
            match recipe.products.first() {
                None => return Err(CatalogError::NoProducts(*scheme_id)),
                Some(product) if product.quantity == 0 => {
                    return Err(CatalogError::ZeroOutput(*scheme_id));
                }
                Some(_) => {}
            }
        }

        for (type_id, scheme_id) in &type_schemes {
            if !schemes.contains_key(scheme_id) {
                return Err(CatalogError::UnknownScheme {
                    type_id: *type_id,
                    scheme_id: *scheme_id,
                });
            }
        }

        let items = items.into_iter().map(|item| (item.type_id, item)).collect();

        Ok(Self {
            type_schemes,
            schemes,
            items,
        })
    }

    /// Build a catalog with one scheme per produced type, numbered after the type.
    pub fn from_recipes(
        recipes: impl IntoIterator<Item = (TypeId, Recipe)>,
    ) -> Result<Self, CatalogError> {
        let mut type_schemes = HashMap::new();
        let mut schemes = HashMap::new();
        for (type_id, recipe) in recipes {
            let scheme_id = SchemeId(type_id.0);
            type_schemes.insert(type_id, scheme_id);
            schemes.insert(scheme_id, recipe);
        }
        Self::new(type_schemes, schemes, Vec::new())
    }

    /// Attach descriptive data, replacing any previous entry for the same type.
    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemDesc>) -> Self {
        self.items
            .extend(items.into_iter().map(|item| (item.type_id, item)));
        self
    }

    /// The recipe producing `type_id`, or `None` for a base material.
    pub fn recipe(&self, type_id: TypeId) -> Option<&Recipe> {
        self.type_schemes
            .get(&type_id)
            .and_then(|scheme_id| self.schemes.get(scheme_id))
    }

    pub fn name(&self, type_id: TypeId) -> Option<&str> {
        self.items.get(&type_id).map(|item| item.name.as_str())
    }

    /// Display name, falling back to the numeric type id.
    pub fn display_name(&self, type_id: TypeId) -> String {
        self.name(type_id)
            .map(str::to_string)
            .unwrap_or_else(|| type_id.to_string())
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDesc> {
        self.items.values()
    }

    pub fn scheme_count(&self) -> usize {
        self.schemes.len()
    }

    pub fn producible_count(&self) -> usize {
        self.type_schemes.len()
    }
}
