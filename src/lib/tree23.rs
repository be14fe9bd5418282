//! A 2-3 tree set implementation.
#![warn(missing_docs)]

use std::borrow::Borrow;
use std::fmt;

pub mod card;
mod tree23_check;
mod tree23_iter;
mod tree23_node;

pub use tree23_check::InvariantViolation;
pub use tree23_iter::Iter;
use tree23_node::{Insertion, Link, Node, Position, Removal, Slot};

/// An ordered set of unique elements kept in a 2-3 tree.
///
/// Every node holds one or two elements and every leaf is at the same depth,
/// so lookups, insertions and removals are `O(log n)`. Two elements are the
/// same element when `Ord::cmp` says they are equal.
pub struct Tree23<T> {
    root: Link<T>,
    length: usize,
}

impl<T> Tree23<T> {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        Tree23 {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.root = None;
        self.length = 0;
    }

    /// Returns the number of levels, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut current = self.root.as_deref();
        let mut level = 0;
        while let Some(node) = current {
            current = node.left.as_deref();
            level += 1;
        }
        level
    }

    /// Returns the smallest element.
    pub fn find_min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        node.left_key.as_ref()
    }

    /// Returns the largest element.
    pub fn find_max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while !node.is_leaf() {
            let slot = if node.is_3node() { Slot::Right } else { Slot::Mid };
            node = node.child(slot)?;
        }
        node.right_key.as_ref().or(node.left_key.as_ref())
    }

    /// Returns an in-order iterator over the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref(), self.length)
    }

    /// Returns the elements that satisfy `predicate`, in ascending order.
    pub fn in_order<P>(&self, mut predicate: P) -> Vec<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().filter(|&element| predicate(element)).collect()
    }

    /// Returns the elements that satisfy `predicate` in pre-order: a node's
    /// left element, its left and mid subtrees, then its right element and
    /// right subtree.
    pub fn pre_order<P>(&self, mut predicate: P) -> Vec<&T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut out = Vec::with_capacity(self.length);
        tree23_iter::pre_order(self.root.as_deref(), &mut predicate, &mut out);
        out
    }

    /// Returns the tree level by level: one entry per depth, holding the keys
    /// of each node at that depth from left to right.
    pub fn level_order(&self) -> Vec<Vec<Vec<&T>>> {
        let mut result = Vec::new();
        if let Some(root) = self.root.as_deref() {
            tree23_iter::level_order(root, 0, &mut result);
        }
        result
    }
}

impl<T> Default for Tree23<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree23<T>
where
    T: Ord,
{
    /// Adds an element.
    /// Returns false, leaving the tree unchanged, if an equal element is
    /// already present.
    pub fn add(&mut self, element: T) -> bool {
        let Some(root) = self.root.as_deref_mut() else {
            self.root = Node::leaf(element).into_link();
            self.length = 1;
            return true;
        };

        match root.insert(element) {
            Insertion::Duplicate => return false,
            Insertion::Absorbed => {}
            Insertion::Split(ascended) => {
                // Root split
                self.root = Some(ascended);
                log::trace!("root split, height is now {}", self.height());
            }
        }
        self.length += 1;
        true
    }

    /// Adds every element. Returns true only if all of them were new; the
    /// ones that were new stay in the tree either way.
    pub fn add_all<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let mut all_added = true;
        for element in elements {
            if !self.add(element) {
                all_added = false;
            }
        }
        all_added
    }

    /// Adds every element, or none of them: at the first element that is
    /// already present, everything this call added is removed again and
    /// false is returned.
    pub fn add_all_safe<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Clone,
    {
        let mut added = Vec::new();
        for element in elements {
            let copy = element.clone();
            if !self.add(element) {
                log::debug!("add_all_safe hit a duplicate, rolling back {} elements", added.len());
                for element in &added {
                    self.remove(element);
                }
                return false;
            }
            added.push(copy);
        }
        true
    }

    /// Removes the element equal to `key`.
    /// Returns true if it was present.
    pub fn remove<Q: ?Sized + Ord>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
    {
        let Some(root) = self.root.as_deref_mut() else {
            return false;
        };

        match root.remove(key) {
            Removal::NotFound => return false,
            Removal::Removed => {}
            Removal::Underflow => {
                // The root lost its last key; its only child, if any, takes over.
                self.root = root.left.take();
                if self.root.is_some() {
                    log::trace!("root collapsed, height is now {}", self.height());
                }
            }
        }
        self.length -= 1;
        true
    }

    /// Replaces `which` by `update`. Returns true if `which` was present,
    /// whether or not `update` could be added afterwards.
    pub fn modify<Q: ?Sized + Ord>(&mut self, which: &Q, update: T) -> bool
    where
        T: Borrow<Q>,
    {
        if !self.remove(which) {
            return false;
        }
        self.add(update);
        true
    }

    /// Returns true if an element equal to `key` is present.
    pub fn contains<Q: ?Sized + Ord>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
    {
        self.find(key).is_some()
    }

    /// Returns a reference to the stored element equal to `key`.
    pub fn find<Q: ?Sized + Ord>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match node.locate(key) {
                Position::LeftKey => return node.left_key.as_ref(),
                Position::RightKey => return node.right_key.as_ref(),
                Position::Child(slot) => node.child(slot),
            };
        }
        None
    }
}

/// Copies by walking the tree in order and adding every element to a fresh
/// tree, so the copy shares no nodes with the original.
impl<T: Ord + Clone> Clone for Tree23<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: Ord> FromIterator<T> for Tree23<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Tree23::new();
        tree.add_all(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Tree23<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<'a, T> IntoIterator for &'a Tree23<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree23<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Prints the tree one level per line, each node as `[a b]`.
impl<T: fmt::Display> fmt::Display for Tree23<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root.is_none() {
            return f.write_str("(empty)");
        }
        for (depth, layer) in self.level_order().iter().enumerate() {
            if depth > 0 {
                writeln!(f)?;
            }
            for (i, node) in layer.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                f.write_str("[")?;
                for (j, key) in node.iter().enumerate() {
                    if j > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", key)?;
                }
                f.write_str("]")?;
            }
        }
        Ok(())
    }
}
