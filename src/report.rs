//! Plain-text rendering of production trees and material totals

use std::fmt::{self, Write};

use crate::aggregate::{BaseMaterials, get_base_materials};
use crate::catalog::RecipeCatalog;
use crate::format::{QuantityFormat, format_quantity};
use crate::models::TypeId;
use crate::tree::MaterialTree;

/// Format a production tree as an indented outline.
///
/// Inputs of a collapsed node are hidden and the node is marked with `[+]`;
/// expanded craftable nodes are marked with `[-]`.
pub fn format_tree(tree: &MaterialTree, catalog: &RecipeCatalog) -> String {
    let mut output = String::new();
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop() {
        let prefix = "  ".repeat(node.depth().saturating_sub(1) as usize);
        let marker = match node.production_type() {
            Some(kind) if node.state().is_expanded() => format!(" [-] {kind}"),
            Some(kind) => format!(" [+] {kind}"),
            None => String::new(),
        };

        let _ = writeln!(
            output,
            "{}{} x {} (#{}){}",
            prefix,
            catalog.display_name(node.type_id()),
            format_quantity(node.quantity(), QuantityFormat::Long),
            node.id(),
            marker
        );

        stack.extend(node.visible_children().rev());
    }

    output
}

/// Summary of the base materials needed for one root item
#[derive(Debug)]
pub struct MaterialsSummary {
    pub target: String,
    pub runs: u64,
    pub node_count: usize,
    pub collapsed_as_leaf: bool,
    pub materials: Vec<(String, u64)>,
}

/// Generate a summary of the base materials in `tree`
pub fn summarize_materials(
    tree: &MaterialTree,
    catalog: &RecipeCatalog,
    type_id: TypeId,
    runs: u64,
    treat_collapsed_as_leaf: bool,
) -> (MaterialsSummary, BaseMaterials) {
    let totals = get_base_materials(tree, treat_collapsed_as_leaf);
    let summary = MaterialsSummary {
        target: catalog.display_name(type_id),
        runs,
        node_count: tree.len(),
        collapsed_as_leaf: treat_collapsed_as_leaf,
        materials: totals.named(catalog),
    };
    (summary, totals)
}

impl fmt::Display for MaterialsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Material Summary ===")?;
        writeln!(f, "Target: {} x {}", self.target, format_quantity(self.runs, QuantityFormat::Long))?;
        writeln!(f, "Tree nodes: {}", self.node_count)?;
        if self.collapsed_as_leaf {
            writeln!(f, "Collapsed items counted as purchased")?;
        }
        writeln!(f)?;

        writeln!(f, "Materials required:")?;
        let width = self.materials.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, quantity) in &self.materials {
            writeln!(
                f,
                "  {:<width$}  {:>15}  ({})",
                name,
                format_quantity(*quantity, QuantityFormat::Long),
                format_quantity(*quantity, QuantityFormat::Short),
            )?;
        }

        Ok(())
    }
}
