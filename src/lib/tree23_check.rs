use crate::tree23_node::Node;
use crate::Tree23;
use thiserror::Error;

/// The first broken structural invariant found by [`Tree23::validate`].
///
/// A tree only ends up in one of these states when the element type's
/// ordering is not a total order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A node that is still linked into the tree holds no keys.
    #[error("node at depth {depth} holds no keys")]
    EmptyNode {
        /// Distance from the root.
        depth: usize,
    },
    /// The two keys of a 3-node are not strictly ascending.
    #[error("keys of the node at depth {depth} are not strictly ascending")]
    UnorderedKeys {
        /// Distance from the root.
        depth: usize,
    },
    /// A key is not strictly between the separators that lead to its node.
    #[error("a key at depth {depth} falls outside the range of its parent keys")]
    OutOfBounds {
        /// Distance from the root.
        depth: usize,
    },
    /// An internal node does not have exactly one child more than keys.
    #[error("node at depth {depth} has {found} children, expected {expected}")]
    ChildCount {
        /// Distance from the root.
        depth: usize,
        /// Children present.
        found: usize,
        /// Keys plus one.
        expected: usize,
    },
    /// Leaves sit at different depths.
    #[error("leaf at depth {found} but an earlier leaf is at depth {expected}")]
    LeafDepth {
        /// Depth of the offending leaf.
        found: usize,
        /// Depth of the first leaf visited.
        expected: usize,
    },
    /// The stored element count disagrees with the keys reachable from the root.
    #[error("counted {counted} elements but the tree reports {length}")]
    LengthMismatch {
        /// Keys reachable from the root.
        counted: usize,
        /// Value returned by `len()`.
        length: usize,
    },
}

impl<T: Ord> Tree23<T> {
    /// Walks the whole tree and checks ordering, key uniqueness, child counts,
    /// equal leaf depth and the element count.
    ///
    /// This is `O(n)`; it is meant for tests and debugging, not for every call.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let counted = match self.root.as_deref() {
            None => 0,
            Some(root) => check_node(root, 0, None, None, &mut None)?,
        };
        if counted != self.length {
            return Err(InvariantViolation::LengthMismatch {
                counted,
                length: self.length,
            });
        }
        Ok(())
    }
}

fn check_node<T: Ord>(
    node: &Node<T>,
    depth: usize,
    lower: Option<&T>,
    upper: Option<&T>,
    leaf_depth: &mut Option<usize>,
) -> Result<usize, InvariantViolation> {
    let Some(left_key) = node.left_key.as_ref() else {
        return Err(InvariantViolation::EmptyNode { depth });
    };
    let right_key = node.right_key.as_ref();
    if right_key.is_some_and(|right_key| left_key >= right_key) {
        return Err(InvariantViolation::UnorderedKeys { depth });
    }
    for key in node.keys() {
        if lower.is_some_and(|min| key <= min) || upper.is_some_and(|max| key >= max) {
            return Err(InvariantViolation::OutOfBounds { depth });
        }
    }

    let keys = node.keys().count();
    if node.is_leaf() {
        match *leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(expected) if expected != depth => {
                return Err(InvariantViolation::LeafDepth {
                    found: depth,
                    expected,
                });
            }
            Some(_) => {}
        }
        return Ok(keys);
    }

    let (Some(left), Some(mid)) = (node.left.as_deref(), node.mid.as_deref()) else {
        return Err(child_count(node, depth, keys));
    };
    if node.right.is_some() != node.is_3node() {
        return Err(child_count(node, depth, keys));
    }

    let mut count = keys;
    count += check_node(left, depth + 1, lower, Some(left_key), leaf_depth)?;
    count += check_node(mid, depth + 1, Some(left_key), right_key.or(upper), leaf_depth)?;
    if let Some(right) = node.right.as_deref() {
        count += check_node(right, depth + 1, right_key, upper, leaf_depth)?;
    }
    Ok(count)
}

fn child_count<T>(node: &Node<T>, depth: usize, keys: usize) -> InvariantViolation {
    InvariantViolation::ChildCount {
        depth,
        found: (0..3).filter(|&i| node.child_at(i).is_some()).count(),
        expected: keys + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_trees() {
        let mut tree = Tree23::new();
        assert_eq!(tree.validate(), Ok(()));
        for i in 0..64 {
            tree.add(i);
            assert_eq!(tree.validate(), Ok(()));
        }
    }

    #[test]
    fn test_detects_unordered_keys() {
        let mut tree: Tree23<i32> = [1, 2].into_iter().collect();
        tree.root.as_deref_mut().unwrap().right_key = Some(0);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::UnorderedKeys { depth: 0 })
        );
    }

    #[test]
    fn test_detects_misplaced_separator() {
        let mut tree: Tree23<i32> = [1, 2, 3].into_iter().collect();
        tree.root.as_deref_mut().unwrap().left_key = Some(10);
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::OutOfBounds { depth: 1 })
        );
    }

    #[test]
    fn test_detects_unequal_leaf_depth() {
        let mut tree: Tree23<i32> = [1, 2, 4].into_iter().collect();
        let root = tree.root.as_deref_mut().unwrap();
        root.mid = Some(Box::new(Node {
            left_key: Some(4),
            right_key: None,
            left: Node::leaf(3).into_link(),
            mid: Node::leaf(5).into_link(),
            right: None,
        }));
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::LeafDepth {
                found: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn test_detects_length_mismatch() {
        let mut tree: Tree23<i32> = (0..10).collect();
        tree.length = 3;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::LengthMismatch {
                counted: 10,
                length: 3
            })
        );
        assert!(tree.validate().unwrap_err().to_string().contains("counted 10"));
    }

    #[test]
    fn test_detects_empty_node() {
        let mut tree: Tree23<i32> = [1, 2, 3].into_iter().collect();
        tree.root.as_deref_mut().unwrap().left.as_deref_mut().unwrap().left_key = None;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::EmptyNode { depth: 1 })
        );
    }
}
