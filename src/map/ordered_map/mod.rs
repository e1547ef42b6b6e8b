/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::error::{self, InvariantViolation, MapError};
use log::{debug, trace};
use slab::Slab;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::ops::Index;

/// Index of a node in the arena.
type NodeId = usize;

/// An ordered map.  This implementation uses a
/// [left-leaning red-black tree](https://en.wikipedia.org/wiki/Left-leaning_red%E2%80%93black_tree)
/// whose nodes live in an arena and link to each other by index.
///
/// # Complexity
///
/// Let *n* be the number of elements in the map.
///
/// ## Temporal complexity
///
/// | Operation                  | Best case | Average   | Worst case  |
/// |:-------------------------- | ---------:| ---------:| -----------:|
/// | `new()`                    |      Θ(1) |      Θ(1) |        Θ(1) |
/// | `add()`                    |      Θ(1) | Θ(log(n)) |   Θ(log(n)) |
/// | `remove()`                 |      Θ(1) | Θ(log(n)) |        Θ(n) |
/// | `get()`                    |      Θ(1) | Θ(log(n)) |   Θ(log(n)) |
/// | `set()`                    |      Θ(1) | Θ(log(n)) |   Θ(log(n)) |
/// | `contains()`               |      Θ(1) | Θ(log(n)) |   Θ(log(n)) |
/// | `size()`                   |      Θ(1) |      Θ(1) |        Θ(1) |
/// | `validate()`               |      Θ(n) |      Θ(n) |        Θ(n) |
///
/// The logarithmic bounds hold for trees built by insertions only.
///
/// # Implementation details
///
/// Insertion follows Sedgewick's left-leaning red-black tree: a recursive descent followed, on
/// the way back up, by a left rotation of right-leaning red links, a right rotation of two
/// consecutive left reds and a color flip when both children are red.  The root is made black
/// at the end.
///
/// Removal is a plain binary search tree removal: a node with at most one child is replaced by
/// that child, otherwise it is replaced by its successor.  Removal does **not** rebalance, so
/// after any removal the color invariants, and with them the logarithmic height bound, may no
/// longer hold.  Key ordering and size are always maintained.
///
/// # Example
///
/// ```
/// use llrb_map::{MapError, OrderedMap};
///
/// let mut map = OrderedMap::new();
///
/// map.add(1, "one");
/// map.add(2, "two");
///
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.set(&3, "three"), Err(MapError::KeyNotFound));
/// assert_eq!(map.remove(&2), Some("two"));
/// assert_eq!(map.size(), 1);
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    nodes: Slab<Node<K, V>>,
    root: Option<NodeId>,
    size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    fn new_red(key: K, value: V) -> Node<K, V> {
        Node { key, value, color: Color::Red, left: None, right: None }
    }
}

/// Shape statistics of a valid tree, returned by [`OrderedMap::validate()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    entries: usize,
    black_height: usize,
    height: usize,
}

impl Stats {
    /// Number of entries in the map.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Number of black nodes on every path from the root to an absent child.
    #[must_use]
    pub fn black_height(&self) -> usize {
        self.black_height
    }

    /// Number of nodes on the longest path from the root to a leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }
}

impl<K, V> OrderedMap<K, V> {
    /// Returns `link` if it points to a red node.  Absent links are black.
    fn red(&self, link: Option<NodeId>) -> Option<NodeId> {
        link.filter(|&id| self.nodes[id].color == Color::Red)
    }

    fn is_red(&self, link: Option<NodeId>) -> bool {
        self.red(link).is_some()
    }

    /// Rotates the red right link of `node` to the left and returns the new subtree root.
    ///
    /// ```text
    ///      node                        x
    ///      ╱  ╲                       ╱ ╲
    ///    t1   ┌───┐               ┌──────┐  t3
    ///         │ x │    ───────▶   │ node │
    ///         └───┘               └──────┘
    ///          ╱ ╲                  ╱  ╲
    ///        t2   t3              t1    t2
    /// ```
    ///
    /// `x` takes the color of `node`, and `node` becomes red.
    fn rotate_left(&mut self, node: NodeId, x: NodeId) -> NodeId {
        trace!("rotating left at node {node}");

        self.nodes[node].right = self.nodes[x].left;
        self.nodes[x].left = Some(node);

        self.nodes[x].color = self.nodes[node].color;
        self.nodes[node].color = Color::Red;

        x
    }

    /// Rotates the red left link of `node` to the right and returns the new subtree root.
    ///
    /// ```text
    ///          node                  x
    ///          ╱  ╲                 ╱ ╲
    ///      ┌───┐   t3             t1  ┌──────┐
    ///      │ x │      ───────▶        │ node │
    ///      └───┘                      └──────┘
    ///       ╱ ╲                         ╱  ╲
    ///     t1   t2                     t2    t3
    /// ```
    fn rotate_right(&mut self, node: NodeId, x: NodeId) -> NodeId {
        trace!("rotating right at node {node}");

        self.nodes[node].left = self.nodes[x].right;
        self.nodes[x].right = Some(node);

        self.nodes[x].color = self.nodes[node].color;
        self.nodes[node].color = Color::Red;

        x
    }

    fn flip_colors(&mut self, node: NodeId, left: NodeId, right: NodeId) {
        trace!("flipping colors at node {node}");

        self.nodes[node].color = Color::Red;
        self.nodes[left].color = Color::Black;
        self.nodes[right].color = Color::Black;
    }

    /// Restores the left-leaning shape of the subtree rooted at `node` after one of its children
    /// changed, and returns the new subtree root.
    fn fix_up(&mut self, mut node: NodeId) -> NodeId {
        if let (Some(right), false) =
            (self.red(self.nodes[node].right), self.is_red(self.nodes[node].left))
        {
            node = self.rotate_left(node, right);
        }

        if let Some(left) = self.red(self.nodes[node].left) {
            if self.is_red(self.nodes[left].left) {
                node = self.rotate_right(node, left);
            }
        }

        if let (Some(left), Some(right)) =
            (self.red(self.nodes[node].left), self.red(self.nodes[node].right))
        {
            self.flip_colors(node, left, right);
        }

        node
    }

    fn minimum(&self, node: NodeId) -> NodeId {
        match self.nodes[node].left {
            Some(left) => self.minimum(left),
            None => node,
        }
    }

    fn maximum(&self, node: NodeId) -> NodeId {
        match self.nodes[node].right {
            Some(right) => self.maximum(right),
            None => node,
        }
    }

    /// Unlinks the node with the smallest key from the subtree rooted at `node` and returns the
    /// new subtree root.  The unlinked node stays in the arena.
    fn remove_min(&mut self, node: NodeId) -> Option<NodeId> {
        match self.nodes[node].left {
            None => {
                self.size -= 1;
                self.nodes[node].right.take()
            }
            Some(left) => {
                self.nodes[node].left = self.remove_min(left);
                Some(node)
            }
        }
    }

    fn subtree_height(&self, link: Option<NodeId>) -> usize {
        link.map_or(0, |id| {
            let node = &self.nodes[id];

            1 + self.subtree_height(node.left).max(self.subtree_height(node.right))
        })
    }

    fn count(&self, link: Option<NodeId>) -> usize {
        link.map_or(0, |id| {
            let node = &self.nodes[id];

            1 + self.count(node.left) + self.count(node.right)
        })
    }

    /// Entries in key order.
    fn in_order(&self) -> Vec<(&K, &V)> {
        fn go<'a, K, V>(
            map: &'a OrderedMap<K, V>,
            link: Option<NodeId>,
            out: &mut Vec<(&'a K, &'a V)>,
        ) {
            if let Some(id) = link {
                let node = &map.nodes[id];

                go(map, node.left, out);
                out.push((&node.key, &node.value));
                go(map, node.right, out);
            }
        }

        let mut entries = Vec::with_capacity(self.size);

        go(self, self.root, &mut entries);

        entries
    }

    /// Checks the color rules below `link` and returns its black height.
    fn check_colors(
        &self,
        link: Option<NodeId>,
        parent_is_red: bool,
    ) -> Result<usize, InvariantViolation> {
        let Some(id) = link else {
            return Ok(0);
        };
        let node = &self.nodes[id];
        let is_red = node.color == Color::Red;

        if self.is_red(node.right) {
            return Err(InvariantViolation::RedRightLink);
        }
        if parent_is_red && is_red {
            return Err(InvariantViolation::ConsecutiveReds);
        }

        let left = self.check_colors(node.left, is_red)?;
        let right = self.check_colors(node.right, is_red)?;

        if left != right {
            return Err(InvariantViolation::BlackHeight { left, right });
        }

        Ok(left + usize::from(!is_red))
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Ord,
{
    #[must_use]
    pub fn new() -> OrderedMap<K, V> {
        OrderedMap { nodes: Slab::new(), root: None, size: 0 }
    }

    fn insert(&mut self, link: Option<NodeId>, key: K, value: V) -> NodeId {
        let Some(node) = link else {
            self.size += 1;

            return self.nodes.insert(Node::new_red(key, value));
        };

        match key.cmp(&self.nodes[node].key) {
            Ordering::Less => {
                let left = self.nodes[node].left;
                let left = self.insert(left, key, value);

                self.nodes[node].left = Some(left);
            }
            Ordering::Equal => self.nodes[node].value = value,
            Ordering::Greater => {
                let right = self.nodes[node].right;
                let right = self.insert(right, key, value);

                self.nodes[node].right = Some(right);
            }
        }

        self.fix_up(node)
    }

    fn find<Q: ?Sized>(&self, link: Option<NodeId>, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        let id = link?;
        let node = &self.nodes[id];

        match key.cmp(node.key.borrow()) {
            Ordering::Less => self.find(node.left, key),
            Ordering::Equal => Some(id),
            Ordering::Greater => self.find(node.right, key),
        }
    }

    /// Removes the node with `key` from the subtree rooted at `link` and returns the new subtree
    /// root.  The removed node is unlinked but stays in the arena.
    fn unlink<Q: ?Sized>(&mut self, link: Option<NodeId>, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        let node = link?;

        match key.cmp(self.nodes[node].key.borrow()) {
            Ordering::Less => {
                let left = self.nodes[node].left;

                self.nodes[node].left = self.unlink(left, key);

                Some(node)
            }
            Ordering::Greater => {
                let right = self.nodes[node].right;

                self.nodes[node].right = self.unlink(right, key);

                Some(node)
            }
            Ordering::Equal => match (self.nodes[node].left, self.nodes[node].right) {
                (None, right) => {
                    trace!("splicing node {node}, promoting its right subtree");
                    self.size -= 1;

                    right
                }
                (left, None) => {
                    trace!("splicing node {node}, promoting its left subtree");
                    self.size -= 1;

                    left
                }
                (Some(left), Some(right)) => {
                    let successor = self.minimum(right);

                    trace!("replacing node {node} with its successor {successor}");

                    let right = self.remove_min(right);
                    let successor_node = &mut self.nodes[successor];

                    successor_node.left = Some(left);
                    successor_node.right = right;

                    Some(successor)
                }
            },
        }
    }

    /// Inserts `key` with `value`.  If `key` is already present its value is replaced and the
    /// tree is left as is.
    pub fn add(&mut self, key: K, value: V) {
        let root = self.root;
        let root = self.insert(root, key, value);

        self.nodes[root].color = Color::Black;
        self.root = Some(root);
    }

    #[must_use]
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.find(self.root, key).map(|id| &self.nodes[id].value)
    }

    #[must_use]
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        let id = self.find(self.root, key)?;

        Some(&mut self.nodes[id].value)
    }

    /// Replaces the value of an existing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::KeyNotFound`] if `key` is not in the map.  The map is not modified.
    pub fn set<Q: ?Sized>(&mut self, key: &Q, value: V) -> error::Result<()>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        let slot = self.get_mut(key).ok_or_else(|| {
            debug!("cannot set the value of an absent key");

            MapError::KeyNotFound
        })?;

        *slot = value;

        Ok(())
    }

    /// Removes `key` and returns its value, or `None` if the key is absent.
    ///
    /// The tree is not rebalanced afterwards.
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        let target = self.find(self.root, key)?;
        let root = self.root;

        self.root = self.unlink(root, key);

        Some(self.nodes.remove(target).value)
    }

    #[must_use]
    pub fn contains<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.find(self.root, key).is_some()
    }

    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.nodes[self.minimum(root)];

            (&node.key, &node.value)
        })
    }

    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.nodes[self.maximum(root)];

            (&node.key, &node.value)
        })
    }

    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of nodes on the longest path from the root to a leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.size = 0;
    }

    /// Checks every tree invariant and returns the shape of the tree.
    ///
    /// A map that only saw insertions is always valid.  Removals keep keys ordered and the size
    /// right but may break the color rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<Stats, InvariantViolation> {
        let ordered = self.in_order().windows(2).all(|pair| pair[0].0 < pair[1].0);

        if !ordered {
            return Err(InvariantViolation::BinarySearch);
        }

        let black_height = self.check_colors(self.root, false)?;

        if self.is_red(self.root) {
            return Err(InvariantViolation::RedRoot);
        }

        let reachable = self.count(self.root);

        if reachable != self.size || self.nodes.len() != self.size {
            return Err(InvariantViolation::SizeConsistency { size: self.size, reachable });
        }

        Ok(Stats { entries: self.size, black_height, height: self.height() })
    }
}

impl<'a, K, Q: ?Sized, V> Index<&'a Q> for OrderedMap<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Ord,
{
    fn default() -> OrderedMap<K, V> {
        OrderedMap::new()
    }
}

impl<K, V: PartialEq> PartialEq for OrderedMap<K, V>
where
    K: Ord,
{
    fn eq(&self, other: &OrderedMap<K, V>) -> bool {
        self.size() == other.size() && self.in_order() == other.in_order()
    }
}

impl<K, V: Eq> Eq for OrderedMap<K, V> where K: Ord {}

impl<K, V> Debug for OrderedMap<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_map().entries(self.in_order()).finish()
    }
}

impl<K, V> Display for OrderedMap<K, V>
where
    K: Display,
    V: Display,
{
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        fmt.write_str("{")?;

        for (k, v) in self.in_order() {
            if !first {
                fmt.write_str(", ")?;
            }
            Display::fmt(k, fmt)?;
            fmt.write_str(": ")?;
            Display::fmt(v, fmt)?;
            first = false;
        }

        fmt.write_str("}")
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use ::serde::ser::{Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    impl<K, V> Serialize for OrderedMap<K, V>
    where
        K: Serialize,
        V: Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.in_order())
        }
    }

    impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
    where
        K: Ord + Deserialize<'de>,
        V: Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<OrderedMap<K, V>, D::Error> {
            deserializer.deserialize_map(OrderedMapVisitor { phantom: PhantomData })
        }
    }

    struct OrderedMapVisitor<K, V> {
        phantom: PhantomData<(K, V)>,
    }

    impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
    where
        K: Ord + Deserialize<'de>,
        V: Deserialize<'de>,
    {
        type Value = OrderedMap<K, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map")
        }

        fn visit_map<A>(self, mut map: A) -> Result<OrderedMap<K, V>, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut ordered_map = OrderedMap::new();

            while let Some((k, v)) = map.next_entry()? {
                ordered_map.add(k, v);
            }

            Ok(ordered_map)
        }
    }
}
