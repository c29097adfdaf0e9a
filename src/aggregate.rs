//! Base material totals for a production tree

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::catalog::RecipeCatalog;
use crate::models::{NodeState, TypeId};
use crate::tree::MaterialTree;

/// Total units of each base material, keyed by type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BaseMaterials(BTreeMap<TypeId, u64>);

impl BaseMaterials {
    pub fn add(&mut self, type_id: TypeId, quantity: u64) {
        let total = self.0.entry(type_id).or_default();
        *total = total.saturating_add(quantity);
    }

    pub fn get(&self, type_id: TypeId) -> Option<u64> {
        self.0.get(&type_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, u64)> + '_ {
        self.0.iter().map(|(type_id, quantity)| (*type_id, *quantity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted by display name, as `(name, quantity)`.
    pub fn named(&self, catalog: &RecipeCatalog) -> Vec<(String, u64)> {
        let mut named: Vec<(String, u64)> = self
            .iter()
            .map(|(type_id, quantity)| (catalog.display_name(type_id), quantity))
            .collect();
        named.sort();
        named
    }

    /// One `name<TAB>quantity` line per material, ready to paste into a
    /// multibuy window.
    pub fn to_multibuy(&self, catalog: &RecipeCatalog) -> String {
        let mut text = String::new();
        for (name, quantity) in self.named(catalog) {
            let _ = writeln!(text, "{name}\t{quantity}");
        }
        text
    }
}

/// Sum the leaves of `tree` by type.
///
/// With `treat_collapsed_as_leaf`, a collapsed node counts as a base material
/// and its inputs are ignored. Otherwise only nodes without children count,
/// whatever their collapse state.
pub fn get_base_materials(tree: &MaterialTree, treat_collapsed_as_leaf: bool) -> BaseMaterials {
    let mut materials = BaseMaterials::default();
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop() {
        let stops_here =
            node.is_leaf() || (treat_collapsed_as_leaf && node.state() == NodeState::Collapsed);
        if stops_here {
            materials.add(node.type_id(), node.quantity());
        } else {
            stack.extend(node.children());
        }
    }

    materials
}
