//! Layer tree model.
//!
//! A layer tree is the decoded form of a layered character image: named
//! groups and pixel layers with bounds in image space and a paint order.
//! It is produced once by an external decoder and never mutated here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{LayerTreeError, ModelError};
use crate::geometry::{Point, Rect};

/// One node of the layer tree: either a group (has children) or a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerNode {
    /// Stable identifier, unique within the tree.
    pub id: String,
    /// Display name, used for semantic matching.
    pub name: String,
    /// Bounding box in image space.
    pub bounds: Rect,
    /// Optional pivot; defaults to the bounds center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Point>,
    /// Child layers in paint order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerNode>,
    /// Paint order.
    #[serde(alias = "zIndex")]
    pub z_index: i32,
    /// Hidden layers take no part in rigging.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl LayerNode {
    /// Creates a visible leaf layer.
    pub fn new(id: impl Into<String>, name: impl Into<String>, bounds: Rect, z_index: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bounds,
            pivot: None,
            children: Vec::new(),
            z_index,
            visible: true,
        }
    }

    /// Creates a group whose bounds cover its children.
    pub fn group(
        id: impl Into<String>,
        name: impl Into<String>,
        z_index: i32,
        children: Vec<LayerNode>,
    ) -> Self {
        let bounds = children
            .iter()
            .map(|c| c.bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self {
            id: id.into(),
            name: name.into(),
            bounds,
            pivot: None,
            children,
            z_index,
            visible: true,
        }
    }

    /// Sets an explicit pivot.
    pub fn with_pivot(mut self, pivot: Point) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// Marks the layer hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Returns true if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the pivot, defaulting to the bounds center.
    pub fn pivot(&self) -> Point {
        self.pivot.unwrap_or_else(|| self.bounds.center())
    }

    /// Returns true for visible leaves that cover at least one pixel.
    pub fn has_pixels(&self) -> bool {
        self.is_leaf() && self.visible && !self.bounds.is_empty()
    }
}

/// A node visited during a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct LayerVisit<'a> {
    /// The node.
    pub node: &'a LayerNode,
    /// Depth below the root (root = 0).
    pub depth: usize,
    /// Index of the parent visit, if any.
    pub parent: Option<usize>,
    /// True if this node or any ancestor is hidden.
    pub hidden: bool,
}

/// The decoded layer hierarchy of one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTree {
    /// Root node (usually the document group).
    pub root: LayerNode,
}

impl LayerTree {
    /// Wraps a root node.
    pub fn new(root: LayerNode) -> Self {
        Self { root }
    }

    /// Parses and validates a layer tree from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let tree: LayerTree = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Pre-order traversal. Parents precede children; siblings keep
    /// document order.
    pub fn walk(&self) -> Vec<LayerVisit<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<(&LayerNode, usize, Option<usize>, bool)> =
            vec![(&self.root, 0, None, !self.root.visible)];

        while let Some((node, depth, parent, hidden)) = stack.pop() {
            let index = out.len();
            out.push(LayerVisit {
                node,
                depth,
                parent,
                hidden,
            });
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1, Some(index), hidden || !child.visible));
            }
        }
        out
    }

    /// Checks id uniqueness, paint order, and bounds.
    pub fn validate(&self) -> Result<(), LayerTreeError> {
        let mut ids = HashSet::new();
        let mut previous: Option<i32> = None;

        for visit in self.walk() {
            let node = visit.node;
            if !ids.insert(node.id.as_str()) {
                return Err(LayerTreeError::DuplicateId(node.id.clone()));
            }
            let b = node.bounds;
            if !(b.x.is_finite() && b.y.is_finite() && b.width.is_finite() && b.height.is_finite())
                || b.width < 0.0
                || b.height < 0.0
            {
                return Err(LayerTreeError::InvalidBounds(node.id.clone()));
            }
            if let Some(prev) = previous {
                if node.z_index <= prev {
                    return Err(LayerTreeError::ZOrder {
                        id: node.id.clone(),
                        z_index: node.z_index,
                        previous: prev,
                    });
                }
            }
            previous = Some(node.z_index);
        }
        Ok(())
    }

    /// Union of all visible pixel-bearing leaves, if any.
    pub fn bounds(&self) -> Option<Rect> {
        self.walk()
            .into_iter()
            .filter(|v| !v.hidden && v.node.has_pixels())
            .map(|v| v.node.bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Finds a node by id.
    pub fn find(&self, id: &str) -> Option<&LayerNode> {
        self.walk().into_iter().map(|v| v.node).find(|n| n.id == id)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.walk().len()
    }

    /// A tree always has its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> LayerTree {
        LayerTree::new(LayerNode::group(
            "doc",
            "Character",
            0,
            vec![
                LayerNode::new("l1", "Body", Rect::new(40.0, 60.0, 40.0, 80.0), 1),
                LayerNode::group(
                    "g1",
                    "Head Group",
                    2,
                    vec![
                        LayerNode::new("l2", "Head", Rect::new(40.0, 10.0, 40.0, 40.0), 3),
                        LayerNode::new("l3", "Hat", Rect::new(40.0, 0.0, 40.0, 10.0), 4).hidden(),
                    ],
                ),
            ],
        ))
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = sample_tree();
        let ids: Vec<&str> = tree.walk().iter().map(|v| v.node.id.as_str()).collect();
        assert_eq!(ids, vec!["doc", "l1", "g1", "l2", "l3"]);

        let visits = tree.walk();
        assert_eq!(visits[3].depth, 2);
        assert_eq!(visits[3].parent, Some(2));
        assert!(visits[4].hidden);
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_tree().validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_id() {
        let mut tree = sample_tree();
        tree.root.children[0].id = "l2".to_string();
        assert_eq!(
            tree.validate(),
            Err(LayerTreeError::DuplicateId("l2".to_string()))
        );
    }

    #[test]
    fn test_validate_z_order() {
        let mut tree = sample_tree();
        tree.root.children[1].z_index = 1;
        assert!(matches!(
            tree.validate(),
            Err(LayerTreeError::ZOrder { .. })
        ));
    }

    #[test]
    fn test_bounds_skip_hidden() {
        let tree = sample_tree();
        assert_eq!(tree.bounds(), Some(Rect::new(40.0, 10.0, 40.0, 130.0)));
    }

    #[test]
    fn test_pivot_defaults_to_center() {
        let node = LayerNode::new("a", "a", Rect::new(0.0, 0.0, 10.0, 20.0), 0);
        assert_eq!(node.pivot(), Point::new(5.0, 10.0));
        let node = node.with_pivot(Point::new(1.0, 1.0));
        assert_eq!(node.pivot(), Point::new(1.0, 1.0));
    }

    #[test]
    fn test_json_accepts_camel_case_z_index() {
        let json = r#"{
            "root": {
                "id": "doc",
                "name": "Doc",
                "bounds": {"x": 0, "y": 0, "width": 10, "height": 10},
                "zIndex": 0,
                "children": [
                    {"id": "h", "name": "head", "bounds": {"x": 0, "y": 0, "width": 10, "height": 10}, "zIndex": 1}
                ]
            }
        }"#;
        let tree = LayerTree::from_json(json).unwrap();
        assert_eq!(tree.root.children[0].z_index, 1);
        assert!(tree.root.children[0].visible);
    }
}
