//! Data models for recipes, production trees and their display projection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Identifies an item type in the recipe catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

/// Identifies a recipe (scheme) in the recipe catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeId(pub u32);

/// Identifies a node within one built production tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Production category of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionType {
    Manufacturing,
    Invention,
    Reaction,
    Pi,
}

impl ProductionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionType::Manufacturing => "manufacturing",
            ProductionType::Invention => "invention",
            ProductionType::Reaction => "reaction",
            ProductionType::Pi => "pi",
        }
    }
}

impl fmt::Display for ProductionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manufacturing" => Ok(ProductionType::Manufacturing),
            "invention" => Ok(ProductionType::Invention),
            "reaction" => Ok(ProductionType::Reaction),
            "pi" => Ok(ProductionType::Pi),
            other => Err(CatalogError::UnknownProductionType(other.to_string())),
        }
    }
}

/// Collapse state of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Expanded,
    Collapsed,
}

impl NodeState {
    pub fn toggled(self) -> Self {
        match self {
            NodeState::Expanded => NodeState::Collapsed,
            NodeState::Collapsed => NodeState::Expanded,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == NodeState::Expanded
    }
}

/// A quantity of one item type, used for both recipe inputs and outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "typeID")]
    pub type_id: TypeId,
    pub quantity: u64,
}

impl Material {
    pub fn new(type_id: TypeId, quantity: u64) -> Self {
        Self { type_id, quantity }
    }
}

/// A production rule: consumes `materials`, yields `products`.
///
/// Catalog construction guarantees `products` is non-empty and its first
/// entry has a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub materials: Vec<Material>,
    pub products: Vec<Material>,
    #[serde(rename = "type")]
    pub production_type: ProductionType,
}

impl Recipe {
    /// Units of the primary product yielded by one run.
    pub fn output_quantity(&self) -> u64 {
        self.products[0].quantity
    }
}

/// Descriptive data for an item type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDesc {
    #[serde(rename = "typeID")]
    pub type_id: TypeId,
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
}

/// Initial collapse rules applied while building a tree.
///
/// Persisted as an ordered array of six booleans, in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<bool>", into = "[bool; 6]")]
pub struct Toggles {
    pub suppress_manufacturing: bool,
    pub suppress_reaction: bool,
    pub suppress_pi: bool,
    pub suppress_fuel_blocks: bool,
    pub suppress_ram: bool,
    pub first_row_only: bool,
}

/// Nitrogen, Hydrogen, Helium and Oxygen fuel blocks.
pub const FUEL_BLOCK_TYPE_IDS: [TypeId; 4] = [TypeId(4051), TypeId(4246), TypeId(4247), TypeId(4312)];

/// Robotic Assembly Modules.
pub const RAM_TYPE_IDS: [TypeId; 13] = [
    TypeId(11475),
    TypeId(11476),
    TypeId(11477),
    TypeId(11478),
    TypeId(11479),
    TypeId(11480),
    TypeId(11481),
    TypeId(11482),
    TypeId(11483),
    TypeId(11484),
    TypeId(11485),
    TypeId(11486),
    TypeId(11487),
];

impl Toggles {
    pub const COUNT: usize = 6;

    /// Every rule disabled: a build leaves all nodes expanded.
    pub const NONE: Toggles = Toggles::from_array([false; 6]);

    pub const fn from_array(flags: [bool; 6]) -> Self {
        Self {
            suppress_manufacturing: flags[0],
            suppress_reaction: flags[1],
            suppress_pi: flags[2],
            suppress_fuel_blocks: flags[3],
            suppress_ram: flags[4],
            first_row_only: flags[5],
        }
    }

    pub fn to_array(self) -> [bool; 6] {
        [
            self.suppress_manufacturing,
            self.suppress_reaction,
            self.suppress_pi,
            self.suppress_fuel_blocks,
            self.suppress_ram,
            self.first_row_only,
        ]
    }

    /// Fallback used when a settings file carries no toggle array.
    pub fn loaded_default() -> Self {
        Self::from_array([true, false, false, true, true, false])
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.to_array().get(index).copied()
    }

    /// Sets the flag at `index`; returns false if the index is out of range.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        let mut flags = self.to_array();
        match flags.get_mut(index) {
            Some(flag) => {
                *flag = value;
                *self = Self::from_array(flags);
                true
            }
            None => false,
        }
    }

    /// Whether a node with a recipe starts collapsed. Any matching rule wins.
    pub fn collapses(&self, type_id: TypeId, production_type: ProductionType, depth: u32) -> bool {
        (self.suppress_manufacturing && production_type == ProductionType::Manufacturing)
            || (self.suppress_reaction && production_type == ProductionType::Reaction)
            || (self.suppress_pi && production_type == ProductionType::Pi)
            || (self.suppress_fuel_blocks && FUEL_BLOCK_TYPE_IDS.contains(&type_id))
            || (self.suppress_ram && RAM_TYPE_IDS.contains(&type_id))
            || (self.first_row_only && depth > 1)
    }
}

impl Default for Toggles {
    fn default() -> Self {
        Self::from_array([true, false, false, true, true, true])
    }
}

impl From<Vec<bool>> for Toggles {
    fn from(flags: Vec<bool>) -> Self {
        let mut array = [false; 6];
        for (slot, flag) in array.iter_mut().zip(flags) {
            *slot = flag;
        }
        Self::from_array(array)
    }
}

impl From<Toggles> for [bool; 6] {
    fn from(toggles: Toggles) -> Self {
        toggles.to_array()
    }
}

/// Canvas coordinates of a display node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Padding around each production node's box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub x: f64,
    pub y: f64,
}

impl Margin {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(margin: f64) -> Self {
        Self::new(margin, margin)
    }
}

/// A positioned node handed to the graph renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    pub id: String,
    pub position: Position,
    #[serde(flatten)]
    pub kind: DisplayKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum DisplayKind {
    /// An item with the quantity required.
    Production {
        #[serde(rename = "typeID")]
        type_id: TypeId,
        quantity: u64,
    },
    /// The expand/collapse affordance below a craftable item.
    SourceButton {
        state: NodeState,
        variant: ProductionType,
        #[serde(rename = "parentID")]
        parent_id: NodeId,
    },
}

/// A connection between two display nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: String, target: String) -> Self {
        Self {
            id: format!("{source}-{target}"),
            source,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_serialize_as_ordered_array() {
        let toggles = Toggles::default();
        let json = serde_json::to_string(&toggles).unwrap();
        assert_eq!(json, "[true,false,false,true,true,true]");
    }

    #[test]
    fn short_toggle_arrays_pad_with_false() {
        let toggles: Toggles = serde_json::from_str("[false, true]").unwrap();
        assert!(toggles.suppress_reaction);
        assert!(!toggles.first_row_only);
        assert!(!toggles.suppress_ram);
    }

    #[test]
    fn toggle_rules_match_independently() {
        let toggles = Toggles {
            suppress_reaction: true,
            first_row_only: true,
            ..Toggles::NONE
        };
        assert!(toggles.collapses(TypeId(1), ProductionType::Reaction, 1));
        assert!(toggles.collapses(TypeId(1), ProductionType::Manufacturing, 2));
        assert!(!toggles.collapses(TypeId(1), ProductionType::Manufacturing, 1));

        let fuel = Toggles {
            suppress_fuel_blocks: true,
            ..Toggles::NONE
        };
        assert!(fuel.collapses(TypeId(4246), ProductionType::Manufacturing, 3));
        assert!(!fuel.collapses(TypeId(587), ProductionType::Manufacturing, 3));
    }

    #[test]
    fn toggles_set_rejects_out_of_range() {
        let mut toggles = Toggles::NONE;
        assert!(toggles.set(4, true));
        assert!(toggles.suppress_ram);
        assert!(!toggles.set(6, true));
        assert_eq!(toggles.get(6), None);
    }

    #[test]
    fn production_type_parses_catalog_tags() {
        assert_eq!("pi".parse::<ProductionType>().unwrap(), ProductionType::Pi);
        assert!("smelting".parse::<ProductionType>().is_err());
    }

    #[test]
    fn display_nodes_serialize_with_type_tag() {
        let node = DisplayNode {
            id: "b1".to_string(),
            position: Position::new(0.0, 125.0),
            kind: DisplayKind::SourceButton {
                state: NodeState::Collapsed,
                variant: ProductionType::Reaction,
                parent_id: NodeId(1),
            },
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "sourceButton");
        assert_eq!(value["data"]["state"], "collapsed");
        assert_eq!(value["data"]["parentID"], 1);
    }
}
