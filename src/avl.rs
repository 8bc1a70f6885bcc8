//! AvlTree: height-balanced binary search tree, the bucket type of
//! [`ChainedTable`](crate::ChainedTable).
//!
//! Nodes live in a `SlotMap` arena and link to their children by `NodeId`.
//! Each node is referenced by exactly one parent (or by `root`), so the
//! structure stays a tree and dropping the arena drops every element once.
//!
//! Invariants after every public call:
//! - Order: left subtree < node < right subtree under `T: Ord`; no two
//!   stored elements compare equal.
//! - Height: a node's cached height is `1 + max(left, right)`, with a leaf
//!   at 0 and an empty subtree at -1.
//! - Balance: `height(right) - height(left)` is in `-1..=1`.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::mem;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeId;
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: i32,
}

impl<T> Node<T> {
    fn leaf(value: T) -> Self {
        Node {
            value,
            left: None,
            right: None,
            height: 0,
        }
    }
}

/// Depth-first visiting order for [`AvlTree::traverse`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Order {
    Pre,
    In,
    Post,
}

/// What a descent does on meeting an element equal to the one being placed.
#[derive(Copy, Clone)]
enum OnEqual {
    Keep,
    Swap,
}

enum Placed<T> {
    New,
    Replaced(T),
    Rejected,
}

pub struct AvlTree<T> {
    nodes: SlotMap<NodeId, Node<T>>,
    root: Option<NodeId>,
}

impl<T> AvlTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the whole tree: -1 when empty, 0 for a single element.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Smallest stored element.
    pub fn min(&self) -> Option<&T> {
        let mut at = self.root?;
        while let Some(next) = self.nodes[at].left {
            at = next;
        }
        Some(&self.nodes[at].value)
    }

    /// Largest stored element.
    pub fn max(&self) -> Option<&T> {
        let mut at = self.root?;
        while let Some(next) = self.nodes[at].right {
            at = next;
        }
        Some(&self.nodes[at].value)
    }

    /// Visits every element depth-first in the requested order.
    pub fn traverse<F>(&self, order: Order, mut visit: F)
    where
        F: FnMut(&T),
    {
        self.traverse_from(self.root, order, &mut visit);
    }

    fn traverse_from<F>(&self, at: Option<NodeId>, order: Order, visit: &mut F)
    where
        F: FnMut(&T),
    {
        let Some(id) = at else { return };
        let node = &self.nodes[id];
        if order == Order::Pre {
            visit(&node.value);
        }
        self.traverse_from(node.left, order, visit);
        if order == Order::In {
            visit(&node.value);
        }
        self.traverse_from(node.right, order, visit);
        if order == Order::Post {
            visit(&node.value);
        }
    }

    /// Moves every element out, leaving the tree empty. Elements come out in
    /// no particular order.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.root = None;
        self.nodes.drain().map(|(_, node)| node.value)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
    }

    fn height_of(&self, at: Option<NodeId>) -> i32 {
        at.map_or(-1, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let h = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[id].height = h;
    }

    fn balance_factor(&self, id: NodeId) -> i32 {
        let node = &self.nodes[id];
        self.height_of(node.right) - self.height_of(node.left)
    }

    /// Lifts the right child over `id`; returns the new subtree root.
    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[id].right else {
            return id;
        };
        self.nodes[id].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Lifts the left child over `id`; returns the new subtree root.
    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[id].left else {
            return id;
        };
        self.nodes[id].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Refreshes the height of `id` and rotates if its subtree leans by two.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        match self.balance_factor(id) {
            2 => {
                if let Some(right) = self.nodes[id].right {
                    if self.balance_factor(right) < 0 {
                        trace_log!("avl: right-left double rotation");
                        let lifted = self.rotate_right(right);
                        self.nodes[id].right = Some(lifted);
                    }
                }
                trace_log!("avl: rotate left");
                self.rotate_left(id)
            }
            -2 => {
                if let Some(left) = self.nodes[id].left {
                    if self.balance_factor(left) > 0 {
                        trace_log!("avl: left-right double rotation");
                        let lifted = self.rotate_left(left);
                        self.nodes[id].left = Some(lifted);
                    }
                }
                trace_log!("avl: rotate right");
                self.rotate_right(id)
            }
            _ => id,
        }
    }

    /// Unlinks the leftmost node below `id`. Returns the rebalanced subtree
    /// and the detached node, which is still in the arena.
    fn detach_min(&mut self, id: NodeId) -> (Option<NodeId>, NodeId) {
        match self.nodes[id].left {
            None => (self.nodes[id].right, id),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes[id].left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }
}

impl<T: Ord> AvlTree<T> {
    fn find<Q>(&self, q: &Q) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut at = self.root;
        while let Some(id) = at {
            let node = &self.nodes[id];
            at = match q.cmp(node.value.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(q).is_some()
    }

    /// Returns the stored element equal to `q`.
    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(q).map(|id| &self.nodes[id].value)
    }

    /// Inserts `value` unless an equal element is already stored, in which
    /// case the tree is left untouched and `value` is dropped.
    ///
    /// Returns whether the value was inserted.
    pub fn insert(&mut self, value: T) -> bool {
        let (root, placed) = self.place(self.root, value, OnEqual::Keep);
        self.root = Some(root);
        matches!(placed, Placed::New)
    }

    /// Inserts `value`, replacing (and returning) an equal element if one is
    /// stored. Replacement happens in place and never restructures the tree.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let (root, placed) = self.place(self.root, value, OnEqual::Swap);
        self.root = Some(root);
        match placed {
            Placed::Replaced(old) => Some(old),
            Placed::New | Placed::Rejected => None,
        }
    }

    fn place(&mut self, at: Option<NodeId>, value: T, on_equal: OnEqual) -> (NodeId, Placed<T>) {
        let Some(id) = at else {
            return (self.nodes.insert(Node::leaf(value)), Placed::New);
        };
        match value.cmp(&self.nodes[id].value) {
            Ordering::Less => {
                let left = self.nodes[id].left;
                let (child, placed) = self.place(left, value, on_equal);
                self.nodes[id].left = Some(child);
                (self.rebalance(id), placed)
            }
            Ordering::Greater => {
                let right = self.nodes[id].right;
                let (child, placed) = self.place(right, value, on_equal);
                self.nodes[id].right = Some(child);
                (self.rebalance(id), placed)
            }
            Ordering::Equal => match on_equal {
                OnEqual::Keep => {
                    drop(value);
                    (id, Placed::Rejected)
                }
                OnEqual::Swap => {
                    let old = mem::replace(&mut self.nodes[id].value, value);
                    (id, Placed::Replaced(old))
                }
            },
        }
    }

    /// Removes and returns the element equal to `q`.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (root, removed) = self.remove_from(self.root, q);
        self.root = root;
        removed
    }

    fn remove_from<Q>(&mut self, at: Option<NodeId>, q: &Q) -> (Option<NodeId>, Option<T>)
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(id) = at else {
            return (None, None);
        };
        match q.cmp(self.nodes[id].value.borrow()) {
            Ordering::Less => {
                let left = self.nodes[id].left;
                let (child, removed) = self.remove_from(left, q);
                self.nodes[id].left = child;
                (Some(self.rebalance(id)), removed)
            }
            Ordering::Greater => {
                let right = self.nodes[id].right;
                let (child, removed) = self.remove_from(right, q);
                self.nodes[id].right = child;
                (Some(self.rebalance(id)), removed)
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[id].left, self.nodes[id].right);
                match (left, right) {
                    (Some(_), Some(right)) => {
                        // Take the in-order successor's element into this node
                        // and drop the successor's node from the right subtree.
                        let (rest, succ) = self.detach_min(right);
                        self.nodes[id].right = rest;
                        let removed = self
                            .nodes
                            .remove(succ)
                            .map(|succ| mem::replace(&mut self.nodes[id].value, succ.value));
                        (Some(self.rebalance(id)), removed)
                    }
                    (child, None) | (None, child) => {
                        let removed = self.nodes.remove(id).map(|node| node.value);
                        (child, removed)
                    }
                }
            }
        }
    }

    /// Recomputes order, height and balance for every node and checks that
    /// every arena node is reachable from the root. Test-time self check.
    pub fn validate(&self) -> bool {
        let mut reached = 0usize;
        self.check(self.root, None, None, &mut reached).is_some() && reached == self.nodes.len()
    }

    /// Height of the subtree at `at` if it is valid within `(lower, upper)`.
    fn check(
        &self,
        at: Option<NodeId>,
        lower: Option<&T>,
        upper: Option<&T>,
        reached: &mut usize,
    ) -> Option<i32> {
        let Some(id) = at else { return Some(-1) };
        let node = self.nodes.get(id)?;
        *reached += 1;
        if lower.is_some_and(|lo| node.value <= *lo) || upper.is_some_and(|hi| node.value >= *hi) {
            return None;
        }
        let lh = self.check(node.left, lower, Some(&node.value), reached)?;
        let rh = self.check(node.right, Some(&node.value), upper, reached)?;
        let consistent = node.height == 1 + lh.max(rh) && (rh - lh).abs() <= 1;
        consistent.then_some(node.height)
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        self.traverse(Order::In, |v| {
            set.entry(v);
        });
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn in_order<T: Clone>(tree: &AvlTree<T>) -> Vec<T> {
        let mut out = Vec::new();
        tree.traverse(Order::In, |v| out.push(v.clone()));
        out
    }

    /// Invariant: ascending inserts 1..=7 rebalance into a perfect tree of height 2.
    #[test]
    fn ascending_inserts_build_perfect_tree() {
        let mut t = AvlTree::new();
        for v in 1..=7 {
            assert!(t.insert(v));
            assert!(t.validate(), "invalid after inserting {v}");
        }
        assert_eq!(t.height(), 2);
        assert_eq!(t.len(), 7);
        let mut pre = Vec::new();
        t.traverse(Order::Pre, |v| pre.push(*v));
        assert_eq!(pre, vec![4, 2, 1, 3, 6, 5, 7]);
    }

    /// Invariant: descending and zig-zag inserts exercise both double rotations.
    #[test]
    fn double_rotations_keep_tree_valid() {
        let mut t = AvlTree::new();
        for v in [30, 10, 20] {
            t.insert(v);
        }
        assert!(t.validate());
        assert_eq!(t.height(), 1);

        let mut t = AvlTree::new();
        for v in [10, 30, 20] {
            t.insert(v);
        }
        assert!(t.validate());
        assert_eq!(t.height(), 1);

        let mut t = AvlTree::new();
        for v in (0..100).rev() {
            t.insert(v);
        }
        assert!(t.validate());
        assert_eq!(in_order(&t), (0..100).collect::<Vec<_>>());
    }

    /// Invariant: traversal orders follow the tree shape.
    #[test]
    fn traversal_orders() {
        let t: AvlTree<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();
        let mut pre = Vec::new();
        let mut post = Vec::new();
        t.traverse(Order::Pre, |v| pre.push(*v));
        t.traverse(Order::Post, |v| post.push(*v));
        assert_eq!(pre, vec![4, 2, 1, 3, 6, 5, 7]);
        assert_eq!(in_order(&t), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(post, vec![1, 3, 2, 5, 7, 6, 4]);
    }

    /// Invariant: a duplicate insert is a no-op and the stored element is kept.
    #[test]
    fn duplicate_insert_is_noop() {
        let mut t: AvlTree<i32> = (1..=5).collect();
        let height = t.height();
        assert!(!t.insert(3));
        assert_eq!(t.len(), 5);
        assert_eq!(t.height(), height);
        let mut hits = 0;
        t.traverse(Order::In, |v| hits += usize::from(*v == 3));
        assert_eq!(hits, 1);
        assert!(t.validate());
    }

    /// Invariant: `replace` swaps an equal element in place and returns the old one.
    #[test]
    fn replace_returns_previous_equal_element() {
        #[derive(Debug)]
        struct Rec(u32, &'static str);
        impl PartialEq for Rec {
            fn eq(&self, o: &Self) -> bool {
                self.0 == o.0
            }
        }
        impl Eq for Rec {}
        impl PartialOrd for Rec {
            fn partial_cmp(&self, o: &Self) -> Option<Ordering> {
                Some(self.cmp(o))
            }
        }
        impl Ord for Rec {
            fn cmp(&self, o: &Self) -> Ordering {
                self.0.cmp(&o.0)
            }
        }

        let mut t = AvlTree::new();
        assert!(t.replace(Rec(1, "a")).is_none());
        assert!(t.replace(Rec(2, "b")).is_none());
        let old = t.replace(Rec(1, "c")).expect("equal element present");
        assert_eq!(old.1, "a");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(&Rec(1, "")).map(|r| r.1), Some("c"));
        assert!(t.validate());
    }

    /// Invariant: removal covers leaf, single-child and two-children nodes and
    /// rebalances on the way up.
    #[test]
    fn remove_all_node_shapes() {
        let mut t: AvlTree<i32> = (1..=15).collect();
        // leaf
        assert_eq!(t.remove(&1), Some(1));
        assert!(t.validate());
        // node with one child (2 now only has 3)
        assert_eq!(t.remove(&2), Some(2));
        assert!(t.validate());
        // root with two children
        assert_eq!(t.remove(&8), Some(8));
        assert!(t.validate());
        assert_eq!(t.remove(&8), None);
        assert_eq!(in_order(&t), vec![3, 4, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15]);
        for v in [3, 4, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15] {
            assert_eq!(t.remove(&v), Some(v));
            assert!(t.validate());
        }
        assert!(t.is_empty());
        assert_eq!(t.height(), -1);
    }

    /// Invariant: removing from an empty tree or a missing key changes nothing.
    #[test]
    fn remove_missing_is_noop() {
        let mut t: AvlTree<i32> = AvlTree::new();
        assert_eq!(t.remove(&3), None);
        t.extend([1, 2]);
        assert_eq!(t.remove(&3), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn clear_empties_and_tree_is_reusable() {
        let mut t: AvlTree<i32> = (1..=10).collect();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.height(), -1);
        assert!(!t.contains(&5));
        t.insert(5);
        assert_eq!(t.len(), 1);
        assert!(t.validate());
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup() {
        let t: AvlTree<String> = ["b", "a", "c"].iter().map(|s| s.to_string()).collect();
        assert!(t.contains("a"));
        assert_eq!(t.get("c").map(String::as_str), Some("c"));
        assert!(!t.contains("z"));
        assert_eq!(t.min().map(String::as_str), Some("a"));
        assert_eq!(t.max().map(String::as_str), Some("c"));
    }

    /// Invariant: `drain` moves every element out exactly once and empties the tree.
    #[test]
    fn drain_moves_elements_without_dropping() {
        struct Counted(u32, Rc<Cell<u32>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.1.set(self.1.get() + 1);
            }
        }
        impl PartialEq for Counted {
            fn eq(&self, o: &Self) -> bool {
                self.0 == o.0
            }
        }
        impl Eq for Counted {}
        impl PartialOrd for Counted {
            fn partial_cmp(&self, o: &Self) -> Option<Ordering> {
                Some(self.cmp(o))
            }
        }
        impl Ord for Counted {
            fn cmp(&self, o: &Self) -> Ordering {
                self.0.cmp(&o.0)
            }
        }

        let drops = Rc::new(Cell::new(0));
        let mut t = AvlTree::new();
        for i in 0..10 {
            t.insert(Counted(i, drops.clone()));
        }
        let moved: Vec<Counted> = t.drain().collect();
        assert_eq!(drops.get(), 0, "drain must move, not drop");
        assert!(t.is_empty());
        assert!(t.validate());
        assert_eq!(moved.len(), 10);
        drop(moved);
        assert_eq!(drops.get(), 10);

        // Dropping a populated tree drops every element once.
        let mut t = AvlTree::new();
        for i in 0..5 {
            t.insert(Counted(i, drops.clone()));
        }
        drop(t);
        assert_eq!(drops.get(), 15);
    }

    #[test]
    fn debug_lists_in_order() {
        let t: AvlTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{t:?}"), "{1, 2, 3}");
    }
}
