use std::borrow::Borrow;
use std::cmp::Ordering;

pub(super) type Link<T> = Option<Box<Node<T>>>;

/// Child slots of a node, in key order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Slot {
    Left,
    Mid,
    Right,
}

/// Where a searched key falls relative to the keys of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Position {
    LeftKey,
    RightKey,
    Child(Slot),
}

/// Outcome of inserting into a subtree.
pub(super) enum Insertion<T> {
    /// An equal element is already stored; nothing changed.
    Duplicate,
    /// The subtree took the element without growing.
    Absorbed,
    /// The subtree split. The ascended 2-node (one key, `left` and `mid`
    /// children) has to be grafted in by the caller.
    Split(Box<Node<T>>),
}

/// Outcome of removing from a subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Removal {
    NotFound,
    Removed,
    /// The subtree root was left without keys. If it is internal, its only
    /// remaining child sits in `left`.
    Underflow,
}

pub(super) struct Node<T> {
    pub(super) left_key: Option<T>,
    pub(super) right_key: Option<T>,
    pub(super) left: Link<T>,
    pub(super) mid: Link<T>,
    pub(super) right: Link<T>,
}

impl<T> Node<T> {
    pub(super) fn leaf(key: T) -> Self {
        Node::two(key, None, None)
    }

    fn two(key: T, left: Link<T>, mid: Link<T>) -> Self {
        Node {
            left_key: Some(key),
            right_key: None,
            left,
            mid,
            right: None,
        }
    }

    pub(super) fn into_link(self) -> Link<T> {
        Some(Box::new(self))
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.mid.is_none() && self.right.is_none()
    }

    pub(super) fn is_2node(&self) -> bool {
        self.right_key.is_none()
    }

    pub(super) fn is_3node(&self) -> bool {
        self.right_key.is_some()
    }

    /// A node without keys only exists transiently, while deletion repairs
    /// the level above it.
    pub(super) fn is_empty(&self) -> bool {
        self.left_key.is_none()
    }

    /// One-level check: every child this node should have is present and
    /// holds at least one key. Deeper levels are not inspected.
    pub(super) fn is_balanced(&self) -> bool {
        if self.is_leaf() {
            return true;
        }
        let filled = |link: &Link<T>| link.as_deref().is_some_and(|n| !n.is_empty());
        filled(&self.left) && filled(&self.mid) && (self.is_2node() || filled(&self.right))
    }

    pub(super) fn key_at(&self, idx: usize) -> Option<&T> {
        match idx {
            0 => self.left_key.as_ref(),
            1 => self.right_key.as_ref(),
            _ => None,
        }
    }

    pub(super) fn child_at(&self, idx: usize) -> Option<&Node<T>> {
        match idx {
            0 => self.left.as_deref(),
            1 => self.mid.as_deref(),
            2 => self.right.as_deref(),
            _ => None,
        }
    }

    pub(super) fn keys(&self) -> impl Iterator<Item = &T> {
        self.left_key.iter().chain(self.right_key.iter())
    }

    pub(super) fn child(&self, slot: Slot) -> Option<&Node<T>> {
        match slot {
            Slot::Left => self.left.as_deref(),
            Slot::Mid => self.mid.as_deref(),
            Slot::Right => self.right.as_deref(),
        }
    }

    fn child_mut(&mut self, slot: Slot) -> &mut Node<T> {
        match slot {
            Slot::Left => &mut self.left,
            Slot::Mid => &mut self.mid,
            Slot::Right => &mut self.right,
        }
        .as_deref_mut()
        .expect("internal node is missing a child")
    }

    fn take_left_key(&mut self) -> T {
        self.left_key.take().expect("node has no left key")
    }

    fn take_right_key(&mut self) -> T {
        self.right_key.take().expect("node has no right key")
    }

    /// Detaches the smallest key and its left child from a 3-node, leaving a
    /// 2-node behind.
    fn pop_front(&mut self) -> (T, Link<T>) {
        let key = self.take_left_key();
        self.left_key = self.right_key.take();
        let child = self.left.take();
        self.left = self.mid.take();
        self.mid = self.right.take();
        (key, child)
    }

    /// Detaches the largest key and its right child from a 3-node.
    fn pop_back(&mut self) -> (T, Link<T>) {
        (self.take_right_key(), self.right.take())
    }

    /// Turns a 2-node into a 3-node with `key` in front and `child` as the
    /// new leftmost child.
    fn push_front(&mut self, key: T, child: Link<T>) {
        self.right_key = self.left_key.replace(key);
        self.right = self.mid.take();
        self.mid = self.left.take();
        self.left = child;
    }

    fn push_back(&mut self, key: T, child: Link<T>) {
        self.right_key = Some(key);
        self.right = child;
    }

    /// Removes and returns the largest key of this subtree. An emptied leaf
    /// is repaired by the first ancestor that notices it is unbalanced.
    pub(super) fn replace_max(&mut self) -> T {
        let max = if self.is_leaf() {
            match self.right_key.take() {
                Some(key) => key,
                None => self.take_left_key(),
            }
        } else {
            let slot = if self.is_3node() { Slot::Right } else { Slot::Mid };
            self.child_mut(slot).replace_max()
        };
        if !self.is_balanced() {
            self.rebalance();
        }
        max
    }

    /// Removes and returns the smallest key of this subtree.
    pub(super) fn replace_min(&mut self) -> T {
        let min = if self.is_leaf() {
            let key = self.take_left_key();
            self.left_key = self.right_key.take();
            key
        } else {
            self.child_mut(Slot::Left).replace_min()
        };
        if !self.is_balanced() {
            self.rebalance();
        }
        min
    }

    /// Repairs the one child of this node that was left without keys.
    ///
    /// The empty child is refilled either by rotating a key through this node
    /// from a sibling 3-node, or by merging it with a sibling 2-node into a
    /// 3-node. A merge takes one key away from this node; when this node was a
    /// 2-node it is left empty with the merged node as its only child, which
    /// removes one level from the subtree and hands the deficiency to the
    /// parent.
    pub(super) fn rebalance(&mut self) {
        if self.is_leaf() || self.is_empty() {
            return;
        }
        let hollow = |link: &Link<T>| link.as_deref().is_none_or(Node::is_empty);
        if hollow(&self.left) {
            self.fix_left();
        } else if hollow(&self.mid) {
            self.fix_mid();
        } else if self.is_3node() && hollow(&self.right) {
            self.fix_right();
        }
        if self.is_empty() {
            log::trace!("merge emptied an internal node, its subtree lost a level");
        }
        debug_assert!(self.is_empty() || self.is_balanced());
    }

    fn fix_left(&mut self) {
        let orphan = self.child_mut(Slot::Left).left.take();
        let separator = self.take_left_key();
        let sibling = self.child_mut(Slot::Mid);
        if sibling.is_3node() {
            let (borrowed, adopted) = sibling.pop_front();
            self.left_key = Some(borrowed);
            self.left = Node::two(separator, orphan, adopted).into_link();
        } else {
            sibling.push_front(separator, orphan);
            self.left = self.mid.take();
            self.left_key = self.right_key.take();
            self.mid = self.right.take();
        }
    }

    fn fix_mid(&mut self) {
        let orphan = self.child_mut(Slot::Mid).left.take();
        if self.child(Slot::Left).is_some_and(Node::is_3node) {
            let (borrowed, adopted) = self.child_mut(Slot::Left).pop_back();
            let separator = self.take_left_key();
            self.left_key = Some(borrowed);
            self.mid = Node::two(separator, adopted, orphan).into_link();
        } else if self.child(Slot::Right).is_some_and(Node::is_3node) {
            let (borrowed, adopted) = self.child_mut(Slot::Right).pop_front();
            let separator = self.take_right_key();
            self.right_key = Some(borrowed);
            self.mid = Node::two(separator, orphan, adopted).into_link();
        } else {
            let separator = self.take_left_key();
            self.child_mut(Slot::Left).push_back(separator, orphan);
            self.left_key = self.right_key.take();
            self.mid = self.right.take();
        }
    }

    fn fix_right(&mut self) {
        let orphan = self.child_mut(Slot::Right).left.take();
        if self.child(Slot::Mid).is_some_and(Node::is_3node) {
            let (borrowed, adopted) = self.child_mut(Slot::Mid).pop_back();
            let separator = self.take_right_key();
            self.right_key = Some(borrowed);
            self.right = Node::two(separator, adopted, orphan).into_link();
        } else {
            let separator = self.take_right_key();
            self.child_mut(Slot::Mid).push_back(separator, orphan);
            self.right = None;
        }
    }
}

impl<T: Ord> Node<T> {
    /// Finds the key or the child slot to descend into.
    pub(super) fn locate<Q: ?Sized + Ord>(&self, key: &Q) -> Position
    where
        T: Borrow<Q>,
    {
        match self.left_key.as_ref().map(|k| key.cmp(k.borrow())) {
            None | Some(Ordering::Less) => Position::Child(Slot::Left),
            Some(Ordering::Equal) => Position::LeftKey,
            Some(Ordering::Greater) => match self.right_key.as_ref() {
                None => Position::Child(Slot::Mid),
                Some(right_key) => match key.cmp(right_key.borrow()) {
                    Ordering::Less => Position::Child(Slot::Mid),
                    Ordering::Equal => Position::RightKey,
                    Ordering::Greater => Position::Child(Slot::Right),
                },
            },
        }
    }

    pub(super) fn insert(&mut self, element: T) -> Insertion<T> {
        let slot = match self.locate(&element) {
            Position::LeftKey | Position::RightKey => return Insertion::Duplicate,
            Position::Child(slot) => slot,
        };
        if self.is_leaf() {
            return self.insert_into_leaf(slot, element);
        }
        match self.child_mut(slot).insert(element) {
            Insertion::Split(ascended) => self.graft(slot, *ascended),
            outcome => outcome,
        }
    }

    /// `slot` encodes where `element` ranks against the leaf's keys:
    /// `Left` smallest, `Mid` in between, `Right` largest.
    fn insert_into_leaf(&mut self, slot: Slot, element: T) -> Insertion<T> {
        if self.is_2node() {
            if slot == Slot::Left {
                self.right_key = self.left_key.replace(element);
            } else {
                self.right_key = Some(element);
            }
            return Insertion::Absorbed;
        }

        let low = self.take_left_key();
        let high = self.take_right_key();
        let (median, first, second) = match slot {
            Slot::Left => (low, element, high),
            Slot::Mid => (element, low, high),
            Slot::Right => (high, low, element),
        };
        debug_assert!(first < median && median < second);
        Insertion::Split(Box::new(Node::two(
            median,
            Node::leaf(first).into_link(),
            Node::leaf(second).into_link(),
        )))
    }

    /// Attaches the node that ascended out of the child at `slot`.
    fn graft(&mut self, slot: Slot, ascended: Node<T>) -> Insertion<T> {
        let Node {
            left_key,
            left: a,
            mid: b,
            ..
        } = ascended;
        let key = left_key.expect("ascended node carries one key");

        if self.is_2node() {
            if slot == Slot::Left {
                self.right_key = self.left_key.replace(key);
                self.right = self.mid.take();
                self.left = a;
                self.mid = b;
            } else {
                self.right_key = Some(key);
                self.mid = a;
                self.right = b;
            }
            return Insertion::Absorbed;
        }

        let low = self.take_left_key();
        let high = self.take_right_key();
        let (left, mid, right) = (self.left.take(), self.mid.take(), self.right.take());
        let (median, first, second) = match slot {
            Slot::Left => (low, Node::two(key, a, b), Node::two(high, mid, right)),
            Slot::Mid => (key, Node::two(low, left, a), Node::two(high, b, right)),
            Slot::Right => (high, Node::two(low, left, mid), Node::two(key, a, b)),
        };
        Insertion::Split(Box::new(Node::two(
            median,
            first.into_link(),
            second.into_link(),
        )))
    }

    pub(super) fn remove<Q: ?Sized + Ord>(&mut self, key: &Q) -> Removal
    where
        T: Borrow<Q>,
    {
        match self.locate(key) {
            Position::LeftKey if self.is_leaf() => {
                self.left_key = self.right_key.take();
                if self.is_empty() {
                    Removal::Underflow
                } else {
                    Removal::Removed
                }
            }
            Position::RightKey if self.is_leaf() => {
                self.right_key = None;
                Removal::Removed
            }
            // Internal hits swap in the nearest key from a leaf below.
            Position::LeftKey => {
                let max = self.child_mut(Slot::Left).replace_max();
                self.left_key = Some(max);
                self.repair()
            }
            Position::RightKey => {
                let min = self.child_mut(Slot::Right).replace_min();
                self.right_key = Some(min);
                self.repair()
            }
            Position::Child(_) if self.is_leaf() => Removal::NotFound,
            Position::Child(slot) => match self.child_mut(slot).remove(key) {
                Removal::NotFound => Removal::NotFound,
                Removal::Removed | Removal::Underflow => self.repair(),
            },
        }
    }

    fn repair(&mut self) -> Removal {
        if !self.is_balanced() {
            self.rebalance();
        }
        if self.is_empty() {
            Removal::Underflow
        } else {
            Removal::Removed
        }
    }
}
