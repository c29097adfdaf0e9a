//! Property-based tests for tree building, toggling, layout and aggregation.
//!
//! Uses proptest to generate random acyclic recipe catalogs, then checks the
//! structural invariants of trees built from them.

use std::collections::HashSet;

use industry_tree::layout::{compute_node_positions, node_box};
use industry_tree::{
    BaseMaterials, Margin, Material, MaterialTree, NodeId, ProductionType, Recipe, RecipeCatalog,
    Toggles, TypeId, generate_connections, generate_display_nodes, get_base_materials,
};
use proptest::prelude::*;
use proptest::sample::Index;

// ===========================================================================
// Generators
// ===========================================================================

const ROOT: TypeId = TypeId(1000);

type RecipeSpec = (u8, u64, Vec<(usize, u64)>);

fn production_type(kind: u8) -> ProductionType {
    match kind % 4 {
        0 => ProductionType::Manufacturing,
        1 => ProductionType::Reaction,
        2 => ProductionType::Pi,
        _ => ProductionType::Invention,
    }
}

/// Type `1000 + i` may only consume types with a larger index, so every
/// generated catalog is acyclic. The last type is always a base material.
fn catalog_from_specs(specs: &[Option<RecipeSpec>]) -> RecipeCatalog {
    let count = specs.len();
    let recipes = specs
        .iter()
        .enumerate()
        .take(count.saturating_sub(1))
        .filter_map(|(i, spec)| {
            let (kind, output, materials) = spec.as_ref()?;
            let remaining = count - i - 1;
            let type_id = TypeId(1000 + i as u32);
            let recipe = Recipe {
                materials: materials
                    .iter()
                    .map(|&(pick, quantity)| {
                        Material::new(TypeId(1000 + (i + 1 + pick % remaining) as u32), quantity)
                    })
                    .collect(),
                products: vec![Material::new(type_id, *output)],
                production_type: production_type(*kind),
            };
            Some((type_id, recipe))
        });
    RecipeCatalog::from_recipes(recipes).unwrap()
}

fn arb_catalog() -> impl Strategy<Value = RecipeCatalog> {
    (2..=7usize)
        .prop_flat_map(|count| {
            proptest::collection::vec(
                proptest::option::weighted(
                    0.8,
                    (
                        0..4u8,
                        1..=10u64,
                        proptest::collection::vec((0..16usize, 1..=20u64), 1..=3),
                    ),
                ),
                count,
            )
        })
        .prop_map(|specs| catalog_from_specs(&specs))
}

fn arb_toggles() -> impl Strategy<Value = Toggles> {
    proptest::array::uniform6(any::<bool>()).prop_map(Toggles::from_array)
}

/// Node ids reachable from the root without passing through a collapsed node.
fn visible_ids(tree: &MaterialTree) -> HashSet<NodeId> {
    let mut visible = HashSet::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        visible.insert(node.id());
        stack.extend(node.visible_children());
    }
    visible
}

fn leaf_totals(tree: &MaterialTree) -> BaseMaterials {
    let mut totals = BaseMaterials::default();
    for node in tree.nodes().filter(|node| node.is_leaf()) {
        totals.add(node.type_id(), node.quantity());
    }
    totals
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Repeated builds from the same inputs are identical.
    #[test]
    fn build_is_deterministic(
        catalog in arb_catalog(),
        runs in 1..500u64,
        efficiency in 0.0..0.1f64,
        toggles in arb_toggles(),
    ) {
        let me = move |_: TypeId| efficiency;
        let first = MaterialTree::build(&catalog, ROOT, runs, &me, &toggles);
        let second = MaterialTree::build(&catalog, ROOT, runs, &me, &toggles);
        prop_assert_eq!(first, second);
    }

    /// Ids are exactly 1..=N in pre-order, starting at the root.
    #[test]
    fn ids_are_dense_pre_order(catalog in arb_catalog(), runs in 1..500u64) {
        let tree = MaterialTree::build(&catalog, ROOT, runs, &|_: TypeId| 0.0, &Toggles::NONE);
        prop_assert_eq!(tree.root().id(), NodeId(1));

        let ids: Vec<u32> = tree.nodes().map(|node| node.id().0).collect();
        let expected: Vec<u32> = (1..=tree.len() as u32).collect();
        prop_assert_eq!(ids, expected);

        // Every child is numbered after its parent, one level deeper.
        for node in tree.nodes() {
            for child in node.children() {
                prop_assert!(child.id() > node.id());
                prop_assert_eq!(child.depth(), node.depth() + 1);
            }
        }
    }

    /// Toggling twice restores the tree, and never copies the node shape.
    #[test]
    fn toggle_is_an_involution(
        catalog in arb_catalog(),
        toggles in arb_toggles(),
        pick in any::<Index>(),
    ) {
        let tree = MaterialTree::build(&catalog, ROOT, 10, &|_: TypeId| 0.0, &toggles);
        let target = NodeId(pick.index(tree.len()) as u32 + 1);

        let once = tree.toggle_node(target);
        prop_assert!(once.shares_shape_with(&tree));
        for node in once.nodes() {
            let before = tree.node(node.id()).unwrap().state();
            if node.id() == target {
                prop_assert_eq!(node.state(), before.toggled());
            } else {
                prop_assert_eq!(node.state(), before);
            }
        }

        let twice = once.toggle_node(target);
        prop_assert!(twice.shares_shape_with(&tree));
        prop_assert_eq!(twice, tree);
    }

    /// Updating quantities in place matches a fresh build for the new inputs.
    #[test]
    fn update_matches_rebuild(
        catalog in arb_catalog(),
        toggles in arb_toggles(),
        before in 1..500u64,
        after in 1..500u64,
        efficiency in 0.0..0.1f64,
    ) {
        let me = move |_: TypeId| efficiency;
        let mut tree = MaterialTree::build(&catalog, ROOT, before, &|_: TypeId| 0.0, &toggles);
        tree.update_quantities(&catalog, after, &me);

        let rebuilt = MaterialTree::build(&catalog, ROOT, after, &me, &toggles);
        prop_assert_eq!(tree, rebuilt);
    }

    /// Display nodes and edges cover exactly the visible part of the tree.
    #[test]
    fn layout_stops_at_collapsed_nodes(
        catalog in arb_catalog(),
        toggles in arb_toggles(),
        flips in proptest::collection::vec(any::<Index>(), 0..4),
    ) {
        let mut tree = MaterialTree::build(&catalog, ROOT, 1, &|_: TypeId| 0.0, &toggles);
        for flip in flips {
            let id = NodeId(flip.index(tree.len()) as u32 + 1);
            tree = tree.toggle_node(id);
        }

        let visible = visible_ids(&tree);
        let display = generate_display_nodes(&tree, Margin::uniform(40.0));

        let production: HashSet<String> = visible.iter().map(|id| id.to_string()).collect();
        let buttons: HashSet<String> = visible
            .iter()
            .filter(|id| tree.node(**id).unwrap().production_type().is_some())
            .map(|id| format!("b{id}"))
            .collect();
        let emitted: HashSet<String> = display.iter().map(|node| node.id.clone()).collect();
        prop_assert_eq!(display.len(), production.len() + buttons.len());
        prop_assert_eq!(emitted, &production | &buttons);

        for edge in generate_connections(&tree) {
            prop_assert!(production.contains(&edge.source) || buttons.contains(&edge.source));
            prop_assert!(production.contains(&edge.target) || buttons.contains(&edge.target));
            if let Some(parent) = edge.source.strip_prefix('b') {
                let parent: u32 = parent.parse().unwrap();
                prop_assert!(tree.node(NodeId(parent)).unwrap().state().is_expanded());
            }
        }
    }

    /// Visible nodes on one level are left to right in pre-order, a full box apart.
    #[test]
    fn layout_rows_do_not_overlap(catalog in arb_catalog(), toggles in arb_toggles()) {
        let tree = MaterialTree::build(&catalog, ROOT, 1, &|_: TypeId| 0.0, &toggles);
        let margin = Margin::new(10.0, 20.0);
        let (width, height) = node_box(margin);
        let positions = compute_node_positions(&tree, margin);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for node in tree.nodes() {
            let Some(position) = positions.production(&tree, node.id()) else {
                continue;
            };
            let depth = node.depth() as usize;
            prop_assert_eq!(position.y, (depth - 1) as f64 * height);
            if rows.len() < depth {
                rows.resize(depth, Vec::new());
            }
            rows[depth - 1].push(position.x);
        }
        for row in rows {
            for pair in row.windows(2) {
                prop_assert!(pair[1] - pair[0] >= width - 1e-9, "{:?}", row);
            }
        }
    }

    /// Full aggregation sums every true leaf once, whatever the collapse states.
    #[test]
    fn full_aggregation_conserves_leaves(
        catalog in arb_catalog(),
        toggles in arb_toggles(),
        runs in 1..1000u64,
    ) {
        let tree = MaterialTree::build(&catalog, ROOT, runs, &|_: TypeId| 0.0, &toggles);
        let expanded = MaterialTree::build(&catalog, ROOT, runs, &|_: TypeId| 0.0, &Toggles::NONE);

        let totals = get_base_materials(&tree, false);
        prop_assert_eq!(&totals, &leaf_totals(&tree));
        prop_assert_eq!(&totals, &get_base_materials(&expanded, false));
    }

    /// Counting collapsed nodes as leaves never sees a node below a collapsed one.
    #[test]
    fn collapsed_aggregation_uses_visible_frontier(
        catalog in arb_catalog(),
        toggles in arb_toggles(),
    ) {
        let tree = MaterialTree::build(&catalog, ROOT, 7, &|_: TypeId| 0.0, &toggles);
        let visible = visible_ids(&tree);

        let mut frontier = BaseMaterials::default();
        for id in &visible {
            let node = tree.node(*id).unwrap();
            if node.is_leaf() || !node.state().is_expanded() {
                frontier.add(node.type_id(), node.quantity());
            }
        }
        prop_assert_eq!(get_base_materials(&tree, true), frontier);
    }
}
