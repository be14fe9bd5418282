use crate::tree23_node::Node;
use std::iter::FusedIterator;

/// In-order iterator over the elements of a [`Tree23`](crate::Tree23).
pub struct Iter<'a, T> {
    // Stack of (node, index of the next key to yield)
    stack: Vec<(&'a Node<T>, usize)>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(node) = root {
            iter.push_leftmost(node);
        }
        iter
    }

    fn push_leftmost(&mut self, mut node: &'a Node<T>) {
        loop {
            self.stack.push((node, 0));
            match node.child_at(0) {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, idx) = self.stack.pop()?;
        let key = node.key_at(idx)?;

        if node.key_at(idx + 1).is_some() {
            self.stack.push((node, idx + 1));
        }
        // The subtree between this key and the next one comes first.
        if let Some(child) = node.child_at(idx + 1) {
            self.push_leftmost(child);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Node key first, then the left and mid subtrees, then the right key and
/// the right subtree.
pub(super) fn pre_order<'a, T, P>(node: Option<&'a Node<T>>, predicate: &mut P, out: &mut Vec<&'a T>)
where
    P: FnMut(&T) -> bool,
{
    let Some(node) = node else {
        return;
    };
    if let Some(key) = node.left_key.as_ref() {
        if predicate(key) {
            out.push(key);
        }
    }
    pre_order(node.left.as_deref(), predicate, out);
    pre_order(node.mid.as_deref(), predicate, out);
    if let Some(key) = node.right_key.as_ref() {
        if predicate(key) {
            out.push(key);
        }
        pre_order(node.right.as_deref(), predicate, out);
    }
}

/// Collects the keys of every node, grouped by node and then by depth.
pub(super) fn level_order<'a, T>(node: &'a Node<T>, layer: usize, result: &mut Vec<Vec<Vec<&'a T>>>) {
    if node.is_empty() {
        return;
    }
    let node_data: Vec<&T> = node.keys().collect();
    if result.len() > layer {
        result[layer].push(node_data);
    } else {
        result.push(vec![node_data]);
    }

    for i in 0..3 {
        if let Some(child) = node.child_at(i) {
            level_order(child, layer + 1, result);
        }
    }
}
