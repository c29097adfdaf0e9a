//! Spatial layout of a production tree for a node-graph renderer
//!
//! Positions come from a tidy tree layout over the visible part of the tree
//! (collapsed nodes are laid out as leaves). Every craftable node also gets a
//! source button placed half a node below it, between the item and its inputs.
//! Edges run from an item to its button and from the button to each input.

use log::debug;

use crate::models::{DisplayKind, DisplayNode, Edge, Margin, NodeId, Position};
use crate::tree::{MaterialTree, NodeRef};

pub const NODE_WIDTH: f64 = 90.0;
pub const NODE_HEIGHT: f64 = 170.0;

/// Horizontal gap, in node widths, between adjacent siblings.
const SIBLING_SEPARATION: f64 = 1.0;
/// Horizontal gap, in node widths, between adjacent nodes with different parents.
const COUSIN_SEPARATION: f64 = 2.0;

/// Size of one node's layout box, including its margin on both sides.
pub fn node_box(margin: Margin) -> (f64, f64) {
    (NODE_WIDTH + 2.0 * margin.x, NODE_HEIGHT + 2.0 * margin.y)
}

/// Production and button positions of the visible nodes of a tree
#[derive(Debug, Clone, PartialEq)]
pub struct NodePositions {
    production: Vec<Option<Position>>,
    buttons: Vec<Option<Position>>,
}

impl NodePositions {
    /// `None` when the node is hidden below a collapsed ancestor.
    pub fn production(&self, tree: &MaterialTree, id: NodeId) -> Option<Position> {
        tree.node(id).and_then(|node| self.production[node.index()])
    }

    /// `None` for hidden nodes and base materials.
    pub fn button(&self, tree: &MaterialTree, id: NodeId) -> Option<Position> {
        tree.node(id).and_then(|node| self.buttons[node.index()])
    }

    fn production_at(&self, node: NodeRef<'_>) -> Position {
        self.production[node.index()].unwrap_or_default()
    }

    fn button_at(&self, node: NodeRef<'_>) -> Position {
        self.buttons[node.index()].unwrap_or_default()
    }
}

/// Left and right extent of a subtree at each level below its root,
/// relative to the root's x, in node widths.
type Contour = Vec<(f64, f64)>;

/// Visible nodes with every child before its parent.
fn visible_post_order(tree: &MaterialTree) -> Vec<NodeRef<'_>> {
    let mut order = Vec::with_capacity(tree.len());
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(node.visible_children());
    }
    order.reverse();
    order
}

/// Place the children of one node side by side. Returns each child's x relative
/// to the parent and the parent's contour.
fn place_children(children: &[(usize, &Contour)]) -> (Vec<f64>, Contour) {
    let mut offsets = Vec::with_capacity(children.len());
    let mut merged: Contour = Vec::new();

    for (_, contour) in children {
        let shift = if merged.is_empty() {
            0.0
        } else {
            merged
                .iter()
                .zip(contour.iter())
                .enumerate()
                .map(|(level, (placed, next))| {
                    let gap = if level == 0 {
                        SIBLING_SEPARATION
                    } else {
                        COUSIN_SEPARATION
                    };
                    placed.1 - next.0 + gap
                })
                .fold(f64::NEG_INFINITY, f64::max)
        };

        for (level, &(left, right)) in contour.iter().enumerate() {
            match merged.get_mut(level) {
                Some(extent) => extent.1 = right + shift,
                None => merged.push((left + shift, right + shift)),
            }
        }
        offsets.push(shift);
    }

    let center = match (offsets.first(), offsets.last()) {
        (Some(first), Some(last)) => (first + last) / 2.0,
        _ => 0.0,
    };
    for offset in &mut offsets {
        *offset -= center;
    }

    let mut contour = Vec::with_capacity(merged.len() + 1);
    contour.push((0.0, 0.0));
    contour.extend(merged.into_iter().map(|(left, right)| (left - center, right - center)));
    (offsets, contour)
}

/// Lay out the visible part of `tree`, root at the origin.
pub fn compute_node_positions(tree: &MaterialTree, margin: Margin) -> NodePositions {
    let (width, height) = node_box(margin);
    let mut contours: Vec<Option<Contour>> = vec![None; tree.len()];
    let mut offsets = vec![0.0; tree.len()];

    for node in visible_post_order(tree) {
        let children: Vec<(usize, &Contour)> = node
            .visible_children()
            .filter_map(|child| contours[child.index()].as_ref().map(|c| (child.index(), c)))
            .collect();
        let (child_offsets, contour) = place_children(&children);
        let placed: Vec<(usize, f64)> = children
            .iter()
            .map(|(index, _)| *index)
            .zip(child_offsets)
            .collect();

        for (index, offset) in placed {
            offsets[index] = offset;
            contours[index] = None;
        }
        contours[node.index()] = Some(contour);
    }

    let mut production = vec![None; tree.len()];
    let mut buttons = vec![None; tree.len()];
    let mut stack = vec![(tree.root(), 0.0)];
    while let Some((node, parent_x)) = stack.pop() {
        let x = parent_x + offsets[node.index()];
        let position = Position::new(x * width, (node.depth() - 1) as f64 * height);
        production[node.index()] = Some(position);
        if node.production_type().is_some() {
            buttons[node.index()] = Some(Position::new(position.x, position.y + height / 2.0));
        }
        stack.extend(node.visible_children().map(|child| (child, x)));
    }

    NodePositions { production, buttons }
}

fn production_id(id: NodeId) -> String {
    id.to_string()
}

fn button_id(id: NodeId) -> String {
    format!("b{id}")
}

/// One production node per visible tree node, followed by its button if it
/// has a recipe, in pre-order.
pub fn generate_display_nodes(tree: &MaterialTree, margin: Margin) -> Vec<DisplayNode> {
    let positions = compute_node_positions(tree, margin);
    let mut display = Vec::new();
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop() {
        display.push(DisplayNode {
            id: production_id(node.id()),
            position: positions.production_at(node),
            kind: DisplayKind::Production {
                type_id: node.type_id(),
                quantity: node.quantity(),
            },
        });

        if let Some(variant) = node.production_type() {
            display.push(DisplayNode {
                id: button_id(node.id()),
                position: positions.button_at(node),
                kind: DisplayKind::SourceButton {
                    state: node.state(),
                    variant,
                    parent_id: node.id(),
                },
            });
        }

        stack.extend(node.visible_children().rev());
    }

    debug!("generated {} display nodes", display.len());
    display
}

/// Edges between the visible display nodes, in pre-order.
///
/// Inputs hang off their parent's button, so a node without a button has no
/// edges down to its children.
pub fn generate_connections(tree: &MaterialTree) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut stack: Vec<(NodeRef<'_>, Option<String>)> = vec![(tree.root(), None)];

    while let Some((node, incoming)) = stack.pop() {
        if let Some(parent_button) = incoming {
            edges.push(Edge::new(parent_button, production_id(node.id())));
        }

        let button = node.production_type().map(|_| button_id(node.id()));
        if let Some(button) = &button {
            edges.push(Edge::new(production_id(node.id()), button.clone()));
        }

        stack.extend(
            node.visible_children()
                .rev()
                .map(|child| (child, button.clone())),
        );
    }

    edges
}
