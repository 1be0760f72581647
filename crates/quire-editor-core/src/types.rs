//! Cursor types: points and ranges over the element tree.
//!
//! Text offsets are char offsets (NOT bytes, NOT UTF-16). Closed leaves use
//! offset 0 (before the element) and 1 (after it).

use std::cmp::Ordering;

use crate::element::{ElementKind, NodeId};
use crate::error::{EditorError, Result};
use crate::tree::Tree;

/// A caret position: a leaf element and an offset inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub element: NodeId,
    pub offset: usize,
}

impl Point {
    /// Create a point, descending into containers.
    ///
    /// For a container, offset 0 targets the start of its first caret-host
    /// leaf and any other offset the end of its last one.
    pub fn new(tree: &Tree, element: NodeId, offset: usize) -> Result<Self> {
        let Some(target) = tree.get(element) else {
            return Err(EditorError::contract(format!(
                "point target {element:?} is not in the tree"
            )));
        };
        match target.kind() {
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
                if offset == 0 {
                    Self::start_of(tree, element)
                } else {
                    Self::end_of(tree, element)
                }
            }
            ElementKind::Text | ElementKind::Closed => {
                if !tree.is_caret_host(element) {
                    return Err(EditorError::structure(format!(
                        "element {} cannot host a caret",
                        target.key()
                    )));
                }
                let len = tree.leaf_len(element);
                if offset > len {
                    return Err(EditorError::contract(format!(
                        "offset {offset} is past the end ({len}) of element {}",
                        target.key()
                    )));
                }
                Ok(Self { element, offset })
            }
        }
    }

    /// Point at the start of the first caret-host leaf under `element`.
    pub fn start_of(tree: &Tree, element: NodeId) -> Result<Self> {
        tree.caret_leaves(element)
            .first()
            .map(|leaf| Self {
                element: *leaf,
                offset: 0,
            })
            .ok_or_else(|| no_leaf(tree, element))
    }

    /// Point at the end of the last caret-host leaf under `element`.
    pub fn end_of(tree: &Tree, element: NodeId) -> Result<Self> {
        tree.caret_leaves(element)
            .last()
            .map(|leaf| Self {
                element: *leaf,
                offset: tree.leaf_len(*leaf),
            })
            .ok_or_else(|| no_leaf(tree, element))
    }

    /// Retarget this point to the start of `element`.
    pub fn move_to_start(&mut self, tree: &Tree, element: NodeId) -> Result<()> {
        *self = Self::start_of(tree, element)?;
        Ok(())
    }

    /// Retarget this point to the end of `element`.
    pub fn move_to_end(&mut self, tree: &Tree, element: NodeId) -> Result<()> {
        *self = Self::end_of(tree, element)?;
        Ok(())
    }

    pub fn is_equal(&self, other: &Point) -> bool {
        self == other
    }
}

fn no_leaf(tree: &Tree, element: NodeId) -> EditorError {
    EditorError::structure(format!(
        "element {} has no caret-host leaf",
        tree[element].key()
    ))
}

/// Order two points in document order.
pub fn compare_points(tree: &Tree, a: &Point, b: &Point) -> Ordering {
    if a.element == b.element {
        return a.offset.cmp(&b.offset);
    }
    let order = tree.document_order();
    let pos = |id: NodeId| order.iter().position(|n| *n == id);
    pos(a.element).cmp(&pos(b.element))
}

/// A selection: anchor is where it started, focus where the caret is now.
/// They may be in any order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// A collapsed range (caret).
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor.is_equal(&self.focus)
    }

    /// `(start, end)` in document order.
    pub fn ordered(&self, tree: &Tree) -> (Point, Point) {
        match compare_points(tree, &self.anchor, &self.focus) {
            Ordering::Greater => (self.focus, self.anchor),
            Ordering::Less | Ordering::Equal => (self.anchor, self.focus),
        }
    }

    /// True when the focus precedes the anchor.
    pub fn is_backwards(&self, tree: &Tree) -> bool {
        compare_points(tree, &self.anchor, &self.focus) == Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<p>ab<img>cd</p><p><col></p>`
    fn sample() -> (Tree, [NodeId; 6]) {
        let mut tree = Tree::default();
        let p1 = tree.create(ElementKind::Block, "p");
        let ab = tree.create_text("ab");
        let img = tree.create(ElementKind::Closed, "img");
        let cd = tree.create_text("cd");
        let p2 = tree.create(ElementKind::Block, "p");
        let col = tree.create(ElementKind::Closed, "col");
        tree.push_block(p1).unwrap();
        for child in [ab, img, cd] {
            tree.append_child(p1, child).unwrap();
        }
        tree.push_block(p2).unwrap();
        tree.append_child(p2, col).unwrap();
        (tree, [p1, ab, img, cd, p2, col])
    }

    #[test]
    fn test_point_descends_into_containers() {
        let (tree, [p1, ab, _, cd, _, _]) = sample();
        let start = Point::new(&tree, p1, 0).unwrap();
        assert_eq!(start, Point { element: ab, offset: 0 });
        let end = Point::new(&tree, p1, 1).unwrap();
        assert_eq!(end, Point { element: cd, offset: 2 });
    }

    #[test]
    fn test_point_rejects_void_and_empty() {
        let (mut tree, [_, ab, _, _, p2, col]) = sample();
        assert!(matches!(
            Point::new(&tree, col, 0),
            Err(EditorError::Structure(_))
        ));
        assert!(matches!(
            Point::new(&tree, p2, 0),
            Err(EditorError::Structure(_))
        ));
        tree.to_empty(ab);
        assert!(Point::new(&tree, ab, 0).is_err());
    }

    #[test]
    fn test_point_offset_bounds() {
        let (tree, [_, ab, img, _, _, _]) = sample();
        assert!(Point::new(&tree, ab, 2).is_ok());
        assert!(matches!(
            Point::new(&tree, ab, 3),
            Err(EditorError::Contract(_))
        ));
        assert!(Point::new(&tree, img, 1).is_ok());
        assert!(Point::new(&tree, img, 2).is_err());
    }

    #[test]
    fn test_move_to_start_and_end() {
        let (tree, [p1, ab, img, _, _, _]) = sample();
        let mut point = Point::new(&tree, img, 0).unwrap();
        point.move_to_end(&tree, p1).unwrap();
        assert_eq!(tree.leaf_len(point.element), point.offset);
        point.move_to_start(&tree, p1).unwrap();
        assert_eq!(point.element, ab);
        assert_eq!(point.offset, 0);
    }

    #[test]
    fn test_range_ordering() {
        let (tree, [_, ab, _, cd, _, _]) = sample();
        let a = Point::new(&tree, cd, 1).unwrap();
        let b = Point::new(&tree, ab, 1).unwrap();
        let range = Range::new(a, b);
        assert!(!range.is_collapsed());
        assert!(range.is_backwards(&tree));
        assert_eq!(range.ordered(&tree), (b, a));

        let caret = Range::collapsed(a);
        assert!(caret.is_collapsed());
        assert!(!caret.is_backwards(&tree));
    }
}
