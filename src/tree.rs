//! Production tree construction and the operations on a built tree
//!
//! A [`MaterialTree`] is an arena of nodes in pre-order, so node id `n` lives
//! at index `n - 1`. The node shape (item types, depths, child lists) is fixed
//! at build time and shared by every tree derived from it through
//! [`MaterialTree::toggle_node`]; only collapse states and quantities vary
//! between those trees.
//!
//! All traversals use an explicit work stack, so recipe chains of any depth
//! are handled without recursion. The catalog must be acyclic.

use std::sync::Arc;

use log::{debug, trace};

use crate::catalog::RecipeCatalog;
use crate::models::{Material, NodeId, NodeState, ProductionType, Recipe, Toggles, TypeId};

/// Supplies the material efficiency bonus for an item type.
pub trait MaterialEfficiency {
    /// Fractional material reduction for `type_id`, in `[0, 1)`.
    fn efficiency(&self, type_id: TypeId) -> f64;
}

impl<F> MaterialEfficiency for F
where
    F: Fn(TypeId) -> f64,
{
    fn efficiency(&self, type_id: TypeId) -> f64 {
        self(type_id)
    }
}

/// No efficiency bonus for any item.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEfficiency;

impl MaterialEfficiency for NoEfficiency {
    fn efficiency(&self, _type_id: TypeId) -> f64 {
        0.0
    }
}

/// Units of `material` needed to yield `runs` units of the recipe's product.
///
/// Efficiency only reduces multi-unit inputs of manufacturing recipes; the
/// reduced amount is rounded up.
pub fn required_quantity<E>(recipe: &Recipe, material: &Material, runs: u64, efficiency: &E) -> u64
where
    E: MaterialEfficiency + ?Sized,
{
    let batches = runs.div_ceil(recipe.output_quantity());
    if material.quantity == 1 || recipe.production_type != ProductionType::Manufacturing {
        material.quantity.saturating_mul(batches)
    } else {
        let reduced = material.quantity as f64
            * (1.0 - efficiency.efficiency(material.type_id))
            * batches as f64;
        reduced.ceil() as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TreeNode {
    id: NodeId,
    type_id: TypeId,
    depth: u32,
    production_type: Option<ProductionType>,
    children: Vec<usize>,
}

/// The expanded production tree of one root item
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTree {
    nodes: Arc<[TreeNode]>,
    states: Vec<NodeState>,
    quantities: Vec<u64>,
}

/// Borrowed view of one node of a [`MaterialTree`]
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a MaterialTree,
    index: usize,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a TreeNode {
        let tree: &'a MaterialTree = self.tree;
        &tree.nodes[self.index]
    }

    pub fn id(&self) -> NodeId {
        self.node().id
    }

    pub fn type_id(&self) -> TypeId {
        self.node().type_id
    }

    pub fn quantity(&self) -> u64 {
        self.tree.quantities[self.index]
    }

    pub fn state(&self) -> NodeState {
        self.tree.states[self.index]
    }

    /// 1 for the root.
    pub fn depth(&self) -> u32 {
        self.node().depth
    }

    /// `None` for a base material.
    pub fn production_type(&self) -> Option<ProductionType> {
        self.node().production_type
    }

    pub fn is_leaf(&self) -> bool {
        self.node().children.is_empty()
    }

    /// Children in recipe material order, regardless of collapse state.
    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.node()
            .children
            .iter()
            .map(move |&index| NodeRef { tree, index })
    }

    /// Children that are laid out and rendered: none when collapsed.
    pub fn visible_children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let expanded = self.state().is_expanded();
        self.children().filter(move |_| expanded)
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

struct Pending {
    type_id: TypeId,
    runs: u64,
    depth: u32,
    parent: Option<usize>,
}

/// Owns the id counter for one build; ids restart at 1 for every builder.
struct TreeBuilder<'a, E: ?Sized> {
    catalog: &'a RecipeCatalog,
    efficiency: &'a E,
    toggles: &'a Toggles,
    nodes: Vec<TreeNode>,
    states: Vec<NodeState>,
    quantities: Vec<u64>,
}

impl<'a, E> TreeBuilder<'a, E>
where
    E: MaterialEfficiency + ?Sized,
{
    fn new(catalog: &'a RecipeCatalog, efficiency: &'a E, toggles: &'a Toggles) -> Self {
        Self {
            catalog,
            efficiency,
            toggles,
            nodes: Vec::new(),
            states: Vec::new(),
            quantities: Vec::new(),
        }
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32 + 1)
    }

    fn build(mut self, type_id: TypeId, runs: u64) -> MaterialTree {
        let mut stack = vec![Pending {
            type_id,
            runs,
            depth: 1,
            parent: None,
        }];

        while let Some(pending) = stack.pop() {
            let index = self.nodes.len();
            let id = self.next_id();
            let recipe = self.catalog.recipe(pending.type_id);
            let production_type = recipe.map(|recipe| recipe.production_type);

            let state = match production_type {
                Some(kind) if self.toggles.collapses(pending.type_id, kind, pending.depth) => {
                    NodeState::Collapsed
                }
                _ => NodeState::Expanded,
            };

            if let Some(parent) = pending.parent {
                self.nodes[parent].children.push(index);
            }

            trace!(
                "node {} type {} x{} depth {} {:?}",
                id, pending.type_id, pending.runs, pending.depth, state
            );

            self.nodes.push(TreeNode {
                id,
                type_id: pending.type_id,
                depth: pending.depth,
                production_type,
                children: Vec::new(),
            });
            self.states.push(state);
            self.quantities.push(pending.runs);

            if let Some(recipe) = recipe {
                // Reversed so the first material is popped, and numbered, first.
                stack.extend(recipe.materials.iter().rev().map(|material| Pending {
                    type_id: material.type_id,
                    runs: required_quantity(recipe, material, pending.runs, self.efficiency),
                    depth: pending.depth + 1,
                    parent: Some(index),
                }));
            }
        }

        MaterialTree {
            nodes: self.nodes.into(),
            states: self.states,
            quantities: self.quantities,
        }
    }
}

impl MaterialTree {
    /// Expand `type_id` into its full production tree for `runs` units.
    ///
    /// Unknown types become single base-material nodes. Nodes with a recipe
    /// start collapsed when any of the `toggles` rules matches them.
    pub fn build<E>(
        catalog: &RecipeCatalog,
        type_id: TypeId,
        runs: u64,
        efficiency: &E,
        toggles: &Toggles,
    ) -> Self
    where
        E: MaterialEfficiency + ?Sized,
    {
        let tree = TreeBuilder::new(catalog, efficiency, toggles).build(type_id, runs);
        debug!("built tree for type {} x{}: {} nodes", type_id, runs, tree.len());
        tree
    }

    /// Recompute every quantity for new run count and efficiency inputs.
    ///
    /// Mutates in place and keeps shape, ids and collapse states. Each child
    /// is derived from its parent's recipe; a node whose type no longer
    /// resolves to a recipe keeps its children's previous quantities. Clone
    /// the tree first when the previous value is still needed.
    pub fn update_quantities<E>(&mut self, catalog: &RecipeCatalog, runs: u64, efficiency: &E) -> &mut Self
    where
        E: MaterialEfficiency + ?Sized,
    {
        let mut stack = vec![(0, runs)];

        while let Some((index, runs)) = stack.pop() {
            self.quantities[index] = runs;

            let node = &self.nodes[index];
            let Some(recipe) = catalog.recipe(node.type_id) else {
                continue;
            };

            for (&child, material) in node.children.iter().zip(&recipe.materials) {
                stack.push((child, required_quantity(recipe, material, runs, efficiency)));
            }
        }

        debug!("updated quantities for {} nodes to x{}", self.len(), runs);
        self
    }

    /// A new tree with the collapse state of `id` flipped.
    ///
    /// The node shape is shared with `self`. An unknown id yields an equal tree.
    pub fn toggle_node(&self, id: NodeId) -> MaterialTree {
        let mut toggled = self.clone();
        match self.index_of(id) {
            Some(index) => toggled.states[index] = toggled.states[index].toggled(),
            None => trace!("toggle ignored, no node {id}"),
        }
        toggled
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, index: 0 }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.index_of(id).map(|index| NodeRef { tree: self, index })
    }

    /// All nodes in pre-order (ascending id).
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |index| NodeRef { tree: self, index })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether both trees were derived from the same build.
    pub fn shares_shape_with(&self, other: &MaterialTree) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        let index = id.0.checked_sub(1)? as usize;
        (index < self.nodes.len()).then_some(index)
    }
}
