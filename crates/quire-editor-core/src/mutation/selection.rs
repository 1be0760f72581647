//! Resolving a range into the elements it covers.

use crate::element::{ElementKind, NodeId};
use crate::error::Result;
use crate::text_helpers::split_off;
use crate::tree::Tree;
use crate::types::{Point, compare_points};

/// One element covered by a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeItem {
    pub element: NodeId,
    /// Covered `(start, end)` offsets for a partially covered leaf. `None`
    /// means the whole element is covered.
    pub offsets: Option<(usize, usize)>,
}

impl RangeItem {
    fn whole(element: NodeId) -> Self {
        Self {
            element,
            offsets: None,
        }
    }
}

/// Elements spanned by `start..end`: boundary leaves with their covered
/// offsets, plus leaves and fully covered containers in between. Descendants
/// of a listed container are not listed again.
pub fn get_elements_by_range(tree: &Tree, start: &Point, end: &Point) -> Vec<RangeItem> {
    let (start, end) = match compare_points(tree, start, end) {
        std::cmp::Ordering::Greater => (end, start),
        _ => (start, end),
    };

    if start.element == end.element {
        if start.offset == end.offset {
            return Vec::new();
        }
        let len = tree.leaf_len(start.element);
        let item = if start.offset == 0 && end.offset >= len {
            RangeItem::whole(start.element)
        } else {
            RangeItem {
                element: start.element,
                offsets: Some((start.offset, end.offset)),
            }
        };
        return vec![item];
    }

    let order = tree.document_order();
    let (Some(first), Some(last)) = (
        order.iter().position(|n| *n == start.element),
        order.iter().position(|n| *n == end.element),
    ) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    let start_len = tree.leaf_len(start.element);
    if start.offset == 0 {
        items.push(RangeItem::whole(start.element));
    } else if start.offset < start_len {
        items.push(RangeItem {
            element: start.element,
            offsets: Some((start.offset, start_len)),
        });
    }

    let mut index = first + 1;
    while index < last {
        let id = order[index];
        let subtree = tree.flat_elements(&[id]).len();
        let covered = index + subtree - 1 < last;
        if covered {
            items.push(RangeItem::whole(id));
            index += subtree;
        } else {
            // Contains the end leaf; look inside.
            index += 1;
        }
    }

    let end_len = tree.leaf_len(end.element);
    if end.offset >= end_len {
        items.push(RangeItem::whole(end.element));
    } else if end.offset > 0 {
        items.push(RangeItem {
            element: end.element,
            offsets: Some((0, end.offset)),
        });
    }
    items
}

/// Split a text element at a char offset. The head keeps the identity; the
/// tail is a fresh sibling inserted right after it and returned.
pub(crate) fn split_text(tree: &mut Tree, id: NodeId, offset: usize) -> Result<NodeId> {
    let tail_text = split_off(&mut tree[id].text, offset);
    let tail = tree.clone_element(id, false);
    tree.set_text(tail, tail_text)?;
    tree.insert_after(id, tail)?;
    Ok(tail)
}

/// Split the boundary texts of `start..end` so the span covers whole text
/// elements, returning those texts in document order together with the
/// adjusted boundary points.
pub(crate) fn split_texts_by_range(
    tree: &mut Tree,
    start: Point,
    end: Point,
) -> Result<(Vec<NodeId>, Point, Point)> {
    let mut start = start;
    let mut end = end;

    if tree.is_text(end.element) && end.offset > 0 && end.offset < tree.leaf_len(end.element) {
        split_text(tree, end.element, end.offset)?;
    }
    if tree.is_text(start.element)
        && start.offset > 0
        && start.offset < tree.leaf_len(start.element)
    {
        let tail = split_text(tree, start.element, start.offset)?;
        if end.element == start.element {
            end = Point {
                element: tail,
                offset: end.offset - start.offset,
            };
        }
        start = Point {
            element: tail,
            offset: 0,
        };
    }

    let texts: Vec<NodeId> = get_elements_by_range(tree, &start, &end)
        .into_iter()
        .flat_map(|item| tree.flat_elements(&[item.element]))
        .filter(|id| tree[*id].kind() == ElementKind::Text && !tree[*id].text().is_empty())
        .collect();

    if let (Some(first), Some(last)) = (texts.first(), texts.last()) {
        start = Point {
            element: *first,
            offset: 0,
        };
        end = Point {
            element: *last,
            offset: tree.leaf_len(*last),
        };
    }
    Ok((texts, start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<p>abc<a>def</a></p><p>ghi</p>`
    fn sample() -> (Tree, [NodeId; 6]) {
        let mut tree = Tree::default();
        let p1 = tree.create(ElementKind::Block, "p");
        let abc = tree.create_text("abc");
        let link = tree.create(ElementKind::Inline, "a");
        let def = tree.create_text("def");
        let p2 = tree.create(ElementKind::Block, "p");
        let ghi = tree.create_text("ghi");
        tree.push_block(p1).unwrap();
        tree.append_child(p1, abc).unwrap();
        tree.append_child(p1, link).unwrap();
        tree.append_child(link, def).unwrap();
        tree.push_block(p2).unwrap();
        tree.append_child(p2, ghi).unwrap();
        (tree, [p1, abc, link, def, p2, ghi])
    }

    #[test]
    fn test_range_within_one_leaf() {
        let (tree, [_, abc, ..]) = sample();
        let items = get_elements_by_range(
            &tree,
            &Point { element: abc, offset: 2 },
            &Point { element: abc, offset: 1 },
        );
        assert_eq!(
            items,
            vec![RangeItem {
                element: abc,
                offsets: Some((1, 2))
            }]
        );
    }

    #[test]
    fn test_range_across_blocks_lists_covered_containers() {
        let (tree, [_, abc, link, _, _, ghi]) = sample();
        let items = get_elements_by_range(
            &tree,
            &Point { element: abc, offset: 1 },
            &Point { element: ghi, offset: 2 },
        );
        assert_eq!(
            items,
            vec![
                RangeItem {
                    element: abc,
                    offsets: Some((1, 3))
                },
                RangeItem::whole(link),
                RangeItem {
                    element: ghi,
                    offsets: Some((0, 2))
                },
            ]
        );
    }

    #[test]
    fn test_split_texts_inside_one_leaf() {
        let (mut tree, [p1, abc, ..]) = sample();
        let (texts, start, end) = split_texts_by_range(
            &mut tree,
            Point { element: abc, offset: 1 },
            Point { element: abc, offset: 2 },
        )
        .unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(tree[texts[0]].text(), "b");
        assert_eq!(tree[abc].text(), "a");
        assert_eq!(tree[p1].children().len(), 4);
        assert_eq!(start.offset, 0);
        assert_eq!(end.offset, 1);
    }

    #[test]
    fn test_split_texts_across_elements() {
        let (mut tree, [_, abc, _, def, _, ghi]) = sample();
        let (texts, ..) = split_texts_by_range(
            &mut tree,
            Point { element: abc, offset: 2 },
            Point { element: ghi, offset: 1 },
        )
        .unwrap();
        let contents: Vec<&str> = texts.iter().map(|t| tree[*t].text()).collect();
        assert_eq!(contents, vec!["c", "def", "g"]);
        assert_eq!(texts[1], def);
        assert_eq!(texts[2], ghi);
        assert_eq!(tree[abc].text(), "ab");
    }
}
