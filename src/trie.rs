//! Low-level trie navigation and construction primitives.
//!
//! Everything in this module is private to the crate. [`Node`] is the
//! recursive radix-balanced tree: a [`Node::Leaf`] at depth 1 holding up to
//! 32 elements directly, or a [`Node::Branch`] at depth >= 2 holding up to 32
//! child nodes plus an optional relaxed size table. [`Vector`](crate::Vector)
//! and [`Builder`](crate::Builder) never touch node internals directly; they
//! call through the functions here.
//!
//! A node never carries its own depth: depth is always threaded through the
//! call as a parameter, counted down on the way to the leaves. This mirrors
//! the fact that a node's shape is only meaningful relative to where it sits
//! in a particular tree -- the same physical leaf can be shared by vectors
//! whose roots sit at different depths.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

/// Branching factor of every level of the trie.
pub(crate) const BITS: u32 = 5;
pub(crate) const BRANCH: u32 = 1 << BITS;
/// Maximum depth a tree may grow to: `BRANCH^MAX_DEPTH` elements.
pub(crate) const MAX_DEPTH: u32 = 6;

/// A node of the radix-balanced trie.
pub(crate) enum Node<T> {
    Leaf(Rc<[T]>),
    Branch(Rc<BranchNode<T>>),
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf(s) => Node::Leaf(Rc::clone(s)),
            Node::Branch(b) => Node::Branch(Rc::clone(b)),
        }
    }
}

pub(crate) struct BranchNode<T> {
    pub(crate) children: Box<[Node<T>]>,
    /// `Some` iff this node is relaxed: prefix sums of `children`'s subtree
    /// sizes, same length as `children`. `None` means balanced: every
    /// non-final child is a complete subtree of `BRANCH^(depth-1)` elements
    /// and the final child carries no relaxed descendant.
    pub(crate) sizes: Option<Box<[u32]>>,
    pub(crate) len: u32,
}

/// Full subtree capacity of a node at the given depth.
pub(crate) fn capacity(depth: u32) -> u32 {
    BRANCH.pow(depth)
}

pub(crate) fn node_len<T>(node: &Node<T>) -> u32 {
    match node {
        Node::Leaf(s) => s.len() as u32,
        Node::Branch(b) => b.len,
    }
}

/// Whether `node`'s own size table says it is relaxed. A leaf is never
/// relaxed.
fn is_relaxed<T>(node: &Node<T>) -> bool {
    matches!(node, Node::Branch(b) if b.sizes.is_some())
}

/// The one constructor every branch-producing mutator funnels through:
/// decides balanced vs. relaxed and caches the subtree length. `depth` is the
/// depth of the branch being built (children live at `depth - 1`).
pub(crate) fn make_branch<T>(children: Box<[Node<T>]>, depth: u32) -> Node<T> {
    debug_assert!(depth >= 2);
    debug_assert!(!children.is_empty());
    let child_cap = capacity(depth - 1);
    let n = children.len();
    let mut sizes = Vec::with_capacity(n);
    let mut acc = 0u32;
    let mut balanced = true;
    for (i, child) in children.iter().enumerate() {
        acc += node_len(child);
        sizes.push(acc);
        let is_last = i + 1 == n;
        if !is_last && node_len(child) != child_cap {
            balanced = false;
        }
        if is_last && is_relaxed(child) {
            balanced = false;
        }
    }
    let len = acc;
    let sizes = if balanced {
        None
    } else {
        Some(sizes.into_boxed_slice())
    };
    Node::Branch(Rc::new(BranchNode {
        children,
        sizes,
        len,
    }))
}

/// Locate the child of a branch containing `index` (`index` is local to this
/// node, i.e. in `[0, node_len)`). Returns the child's position in
/// `children` and the number of elements that precede it within this node.
pub(crate) fn locate_child<T>(branch: &BranchNode<T>, depth: u32, index: u32) -> (usize, u32) {
    match &branch.sizes {
        Some(sizes) => {
            // Smallest i such that sizes[i] > index; sizes is strictly
            // increasing so a linear scan over at most 32 entries is as fast
            // as a binary search in practice and reads closer to the source.
            let mut i = 0;
            while sizes[i] <= index {
                i += 1;
            }
            let prefix = if i == 0 { 0 } else { sizes[i - 1] };
            (i, prefix)
        }
        None => {
            let child_cap = capacity(depth - 1);
            let i = (index / child_cap) as usize;
            let i = i.min(branch.children.len() - 1);
            (i, i as u32 * child_cap)
        }
    }
}

/// Read-only descent to the element at `index` (local to `node`).
pub(crate) fn get<T>(node: &Node<T>, depth: u32, index: u32) -> &T {
    match node {
        Node::Leaf(s) => &s[index as usize],
        Node::Branch(b) => {
            let (child_idx, prefix) = locate_child(b, depth, index);
            get(&b.children[child_idx], depth - 1, index - prefix)
        }
    }
}

/// Descend to the leaf slice containing `index` (local to `node`), returning
/// the slice and the index of its first element, both relative to `node`.
pub(crate) fn locate_leaf<T>(node: &Node<T>, depth: u32, index: u32) -> (&[T], u32) {
    match node {
        Node::Leaf(s) => (s, 0),
        Node::Branch(b) => {
            let (child_idx, prefix) = locate_child(b, depth, index);
            let (leaf, leaf_start) = locate_leaf(&b.children[child_idx], depth - 1, index - prefix);
            (leaf, prefix + leaf_start)
        }
    }
}

/// Path-copying update of the element at `index` (local to `node`).
pub(crate) fn update<T: Clone>(node: &Node<T>, depth: u32, index: u32, value: T) -> Node<T> {
    match node {
        Node::Leaf(s) => {
            let mut v: Vec<T> = s.to_vec();
            v[index as usize] = value;
            Node::Leaf(Rc::from(v))
        }
        Node::Branch(b) => {
            let (child_idx, prefix) = locate_child(b, depth, index);
            let mut children: Vec<Node<T>> = b.children.to_vec();
            children[child_idx] = update(&children[child_idx], depth - 1, index - prefix, value);
            make_branch(children.into_boxed_slice(), depth)
        }
    }
}

/// Outcome of trying to graft one more element onto a node without changing
/// its depth.
pub(crate) enum Grow<T> {
    /// The element fit; here is the replacement node (same depth).
    Done(Node<T>),
    /// The node was already full. Here is a freshly built sibling of the
    /// same depth that the caller must attach one level up.
    Overflow(Node<T>),
}

/// Append `elem` to the rightmost edge of `node`.
pub(crate) fn push_back<T: Clone>(node: &Node<T>, depth: u32, elem: T) -> Grow<T> {
    match node {
        Node::Leaf(s) => {
            if s.len() < BRANCH as usize {
                let mut v: Vec<T> = s.to_vec();
                v.push(elem);
                Grow::Done(Node::Leaf(Rc::from(v)))
            } else {
                Grow::Overflow(Node::Leaf(Rc::from(alloc::vec![elem])))
            }
        }
        Node::Branch(b) => {
            let last = b.children.len() - 1;
            match push_back(&b.children[last], depth - 1, elem) {
                Grow::Done(new_last) => {
                    let mut children: Vec<Node<T>> = b.children.to_vec();
                    children[last] = new_last;
                    Grow::Done(make_branch(children.into_boxed_slice(), depth))
                }
                Grow::Overflow(sibling) => {
                    if b.children.len() < BRANCH as usize {
                        let mut children: Vec<Node<T>> = b.children.to_vec();
                        children.push(sibling);
                        Grow::Done(make_branch(children.into_boxed_slice(), depth))
                    } else {
                        Grow::Overflow(make_branch(alloc::vec![sibling].into_boxed_slice(), depth))
                    }
                }
            }
        }
    }
}

/// Prepend `elem` to the leftmost edge of `node`.
pub(crate) fn push_front<T: Clone>(node: &Node<T>, depth: u32, elem: T) -> Grow<T> {
    match node {
        Node::Leaf(s) => {
            if s.len() < BRANCH as usize {
                let mut v: Vec<T> = Vec::with_capacity(s.len() + 1);
                v.push(elem);
                v.extend_from_slice(s);
                Grow::Done(Node::Leaf(Rc::from(v)))
            } else {
                Grow::Overflow(Node::Leaf(Rc::from(alloc::vec![elem])))
            }
        }
        Node::Branch(b) => match push_front(&b.children[0], depth - 1, elem) {
            Grow::Done(new_first) => {
                let mut children: Vec<Node<T>> = b.children.to_vec();
                children[0] = new_first;
                Grow::Done(make_branch(children.into_boxed_slice(), depth))
            }
            Grow::Overflow(sibling) => {
                if b.children.len() < BRANCH as usize {
                    let mut children: Vec<Node<T>> = Vec::with_capacity(b.children.len() + 1);
                    children.push(sibling);
                    children.extend(b.children.iter().cloned());
                    Grow::Done(make_branch(children.into_boxed_slice(), depth))
                } else {
                    Grow::Overflow(make_branch(alloc::vec![sibling].into_boxed_slice(), depth))
                }
            }
        },
    }
}

/// Grow `root` by one level, wrapping it as the first child next to
/// `sibling`. Mirrors `appendBackNewBlock`/`prependFrontNewBlock` growing the
/// tree when the existing root overflowed.
pub(crate) fn grow_root_back<T>(root: Node<T>, sibling: Node<T>, depth: u32) -> Node<T> {
    make_branch(alloc::vec![root, sibling].into_boxed_slice(), depth + 1)
}

pub(crate) fn grow_root_front<T>(root: Node<T>, sibling: Node<T>, depth: u32) -> Node<T> {
    make_branch(alloc::vec![sibling, root].into_boxed_slice(), depth + 1)
}

/// First `n` elements of `node` (`0 < n < node_len(node)`).
pub(crate) fn take<T: Clone>(node: &Node<T>, depth: u32, n: u32) -> Node<T> {
    match node {
        Node::Leaf(s) => Node::Leaf(Rc::from(&s[..n as usize])),
        Node::Branch(b) => {
            let (child_idx, prefix) = locate_child(b, depth, n - 1);
            let local_n = n - prefix;
            let mut children: Vec<Node<T>> = b.children[..=child_idx].to_vec();
            let last = children.len() - 1;
            if local_n != node_len(&children[last]) {
                children[last] = take(&b.children[child_idx], depth - 1, local_n);
            }
            make_branch(children.into_boxed_slice(), depth)
        }
    }
}

/// Elements of `node` from `n` onward (`0 < n < node_len(node)`).
pub(crate) fn drop<T: Clone>(node: &Node<T>, depth: u32, n: u32) -> Node<T> {
    match node {
        Node::Leaf(s) => Node::Leaf(Rc::from(&s[n as usize..])),
        Node::Branch(b) => {
            let (child_idx, prefix) = locate_child(b, depth, n);
            let local_n = n - prefix;
            let mut children: Vec<Node<T>> = b.children[child_idx..].to_vec();
            if local_n != 0 {
                children[0] = drop(&b.children[child_idx], depth - 1, local_n);
            }
            make_branch(children.into_boxed_slice(), depth)
        }
    }
}

/// Strip single-child wrapper branches left behind by `take`/`drop`/concat
/// so the tree sits at the shallowest depth that fits its contents. Mirrors
/// `cleanTopTake`/`cleanTopDrop` discarding emptied upper levels.
pub(crate) fn canonicalize<T>(mut node: Node<T>, mut depth: u32) -> (Node<T>, u32) {
    while depth > 1 {
        match &node {
            Node::Branch(b) if b.children.len() == 1 => {
                let only = b.children[0].clone();
                node = only;
                depth -= 1;
            }
            _ => break,
        }
    }
    (node, depth)
}

/// Wrap `node` with single-child branches until it reaches `target_depth`.
pub(crate) fn wrap_to_depth<T>(node: Node<T>, depth: u32, target_depth: u32) -> Node<T> {
    let mut node = node;
    let mut depth = depth;
    while depth < target_depth {
        node = make_branch(alloc::vec![node].into_boxed_slice(), depth + 1);
        depth += 1;
    }
    node
}

/// Merge two same-size leaves, preferring to leave an already-full block
/// untouched rather than copy it.
fn rebalanced_leaves<T: Clone>(left: &[T], right: &[T]) -> Vec<Node<T>> {
    if left.len() == BRANCH as usize {
        return alloc::vec![Node::Leaf(Rc::from(left)), Node::Leaf(Rc::from(right))];
    }
    let mut combined: Vec<T> = Vec::with_capacity(left.len() + right.len());
    combined.extend_from_slice(left);
    combined.extend_from_slice(right);
    if combined.len() <= BRANCH as usize {
        alloc::vec![Node::Leaf(Rc::from(combined))]
    } else {
        let second = combined.split_off(BRANCH as usize);
        alloc::vec![Node::Leaf(Rc::from(combined)), Node::Leaf(Rc::from(second))]
    }
}

/// Regroup a flat run of nodes one level below `depth` into full-by-
/// preference branches at `depth`.
fn group_into_nodes<T>(children: Vec<Node<T>>, depth: u32) -> Vec<Node<T>> {
    debug_assert!(depth >= 2);
    children
        .chunks(BRANCH as usize)
        .map(|chunk| make_branch(chunk.to_vec().into_boxed_slice(), depth))
        .collect()
}

/// Concatenate two same-depth nodes, rebalancing only along the boundary
/// between them. Returns 1 or 2 new nodes of the same depth; the caller
/// (one level up, or the top-level `concat`) decides whether the result
/// fits as a single child or must be split across two.
pub(crate) fn concat_at_depth<T: Clone>(left: &Node<T>, right: &Node<T>, depth: u32) -> Vec<Node<T>> {
    if depth == 1 {
        let (Node::Leaf(l), Node::Leaf(r)) = (left, right) else {
            unreachable!("depth 1 nodes are always leaves")
        };
        return rebalanced_leaves(l, r);
    }
    let (Node::Branch(lb), Node::Branch(rb)) = (left, right) else {
        unreachable!("depth >= 2 nodes are always branches")
    };
    let merged_mid = concat_at_depth(
        &lb.children[lb.children.len() - 1],
        &rb.children[0],
        depth - 1,
    );
    let mut all: Vec<Node<T>> = Vec::with_capacity(
        (lb.children.len() - 1) + merged_mid.len() + (rb.children.len() - 1),
    );
    all.extend(lb.children[..lb.children.len() - 1].iter().cloned());
    all.extend(merged_mid);
    all.extend(rb.children[1..].iter().cloned());
    group_into_nodes(all, depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(vals: &[i32]) -> Node<i32> {
        Node::Leaf(Rc::from(vals))
    }

    #[test]
    fn capacity_powers_of_branch() {
        assert_eq!(capacity(1), 32);
        assert_eq!(capacity(2), 1024);
        assert_eq!(capacity(6), 32i64.pow(6) as u32);
    }

    #[test]
    fn make_branch_balanced_when_full_prefix() {
        let full: Vec<i32> = (0..32).collect();
        let children: Vec<Node<i32>> = alloc::vec![leaf(&full), leaf(&[1, 2, 3])];
        let branch = make_branch(children.into_boxed_slice(), 2);
        match branch {
            Node::Branch(b) => {
                assert!(b.sizes.is_none());
                assert_eq!(b.len, 35);
            }
            _ => panic!("expected branch"),
        }
    }

    #[test]
    fn make_branch_relaxed_when_prefix_short() {
        let children: Vec<Node<i32>> = alloc::vec![leaf(&[1, 2, 3]), leaf(&[4, 5])];
        let branch = make_branch(children.into_boxed_slice(), 2);
        match branch {
            Node::Branch(b) => {
                let sizes = b.sizes.expect("should be relaxed");
                assert_eq!(&*sizes, &[3, 5]);
                assert_eq!(b.len, 5);
            }
            _ => panic!("expected branch"),
        }
    }

    #[test]
    fn locate_child_balanced_divides_evenly() {
        let full: Vec<i32> = (0..32).collect();
        let children: Vec<Node<i32>> = alloc::vec![leaf(&full), leaf(&full), leaf(&[1, 2])];
        let branch = make_branch(children.into_boxed_slice(), 2);
        let Node::Branch(b) = &branch else { unreachable!() };
        assert_eq!(locate_child(b, 2, 0), (0, 0));
        assert_eq!(locate_child(b, 2, 31), (0, 0));
        assert_eq!(locate_child(b, 2, 32), (1, 32));
        assert_eq!(locate_child(b, 2, 64), (2, 64));
    }

    #[test]
    fn push_back_fills_then_overflows() {
        let mut node = leaf(&[]);
        let depth = 1;
        for i in 0..32 {
            match push_back(&node, depth, i) {
                Grow::Done(n) => node = n,
                Grow::Overflow(_) => panic!("should not overflow before 32 elements"),
            }
        }
        assert_eq!(node_len(&node), 32);
        match push_back(&node, depth, 99) {
            Grow::Overflow(sibling) => assert_eq!(node_len(&sibling), 1),
            Grow::Done(_) => panic!("leaf should have overflowed at 33rd element"),
        }
    }
}
