//! Nested-set arithmetic: boundary shifts, range predicates and invariant checks.
//!
//! Everything here is pure and works on plain [`Node`] values; the stores
//! execute the resulting plans against their own storage.

use std::fmt;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::entities::{Node, NodeId};

/// Boundary slots consumed by one node (`lft` and `rgt`).
pub const SLOT_WIDTH: i64 = 2;

/// Renumbering that opens `by` slots starting at boundary value `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryShift {
    pub from: i64,
    pub by: i64,
}

impl BoundaryShift {
    pub fn shifts_lft(&self, node: &Node) -> bool {
        node.lft >= self.from
    }

    pub fn shifts_rgt(&self, node: &Node) -> bool {
        node.rgt >= self.from
    }

    /// Apply the shift to a single node in place. Returns true if it moved.
    pub fn apply(&self, node: &mut Node) -> bool {
        let mut moved = false;
        if self.shifts_lft(node) {
            node.lft += self.by;
            moved = true;
        }
        if self.shifts_rgt(node) {
            node.rgt += self.by;
            moved = true;
        }
        moved
    }
}

/// Everything needed to append a leaf as the last child of a parent.
///
/// Built from the parent as read inside the same atomic unit that applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPlan {
    pub parent: NodeId,
    pub shift: BoundaryShift,
    pub level: i64,
    pub lft: i64,
    pub rgt: i64,
}

impl InsertionPlan {
    /// Open two slots right at the parent's current right boundary `r`:
    /// every `lft >= r` and every `rgt >= r` moves by two, and the new leaf
    /// takes `(r, r + 1)` one level below the parent.
    pub fn for_parent(parent: &Node) -> Self {
        let r = parent.rgt;
        Self {
            parent: parent.id,
            shift: BoundaryShift {
                from: r,
                by: SLOT_WIDTH,
            },
            level: parent.level + 1,
            lft: r,
            rgt: r + 1,
        }
    }

    /// Shift every node in `nodes`. Returns the number of nodes that moved.
    pub fn apply_shift<'a>(&self, nodes: impl IntoIterator<Item = &'a mut Node>) -> usize {
        nodes
            .into_iter()
            .map(|n| self.shift.apply(n))
            .filter(|moved| *moved)
            .count()
    }

    /// The node this plan creates, once the store has assigned its id.
    pub fn node(&self, id: NodeId) -> Node {
        Node {
            id,
            level: self.level,
            lft: self.lft,
            rgt: self.rgt,
        }
    }
}

/// Direct-child predicate: strictly inside the parent's interval and exactly one level deeper.
pub fn is_child_of(parent: &Node, candidate: &Node) -> bool {
    parent.contains(candidate) && candidate.level == parent.level + 1
}

/// Descendant predicate: strictly inside the parent's interval, at any depth.
pub fn is_descendant_of(ancestor: &Node, candidate: &Node) -> bool {
    ancestor.contains(candidate)
}

/// Direct children of `parent` among `nodes`, in `lft` order.
pub fn children<'a>(parent: &Node, nodes: impl IntoIterator<Item = &'a Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|n| is_child_of(parent, n))
        .copied()
        .sorted_by_key(|n| n.lft)
        .collect()
}

/// All descendants of `ancestor` among `nodes`, in `lft` order.
pub fn descendants<'a>(ancestor: &Node, nodes: impl IntoIterator<Item = &'a Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|n| is_descendant_of(ancestor, n))
        .copied()
        .sorted_by_key(|n| n.lft)
        .collect()
}

/// A single broken invariant found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `lft >= rgt`
    EmptyInterval { id: NodeId },
    /// Span not a whole number of slot pairs, so `children_count` is meaningless
    UnevenSpan { id: NodeId },
    /// Two boundaries share one value
    DuplicateBoundary { value: i64, first: NodeId, second: NodeId },
    /// Intervals intersect without one containing the other
    PartialOverlap { outer: NodeId, inner: NodeId },
    /// A node nested directly in `parent` sits at the wrong depth
    LevelMismatch {
        id: NodeId,
        parent: NodeId,
        expected: i64,
        actual: i64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyInterval { id } => write!(f, "node {id}: lft is not below rgt"),
            Violation::UnevenSpan { id } => write!(f, "node {id}: interval span is uneven"),
            Violation::DuplicateBoundary {
                value,
                first,
                second,
            } => write!(f, "boundary {value} shared by node {first} and node {second}"),
            Violation::PartialOverlap { outer, inner } => {
                write!(f, "node {outer} and node {inner} overlap without nesting")
            }
            Violation::LevelMismatch {
                id,
                parent,
                expected,
                actual,
            } => write!(
                f,
                "node {id} under node {parent}: level {actual}, expected {expected}"
            ),
        }
    }
}

/// Outcome of a full-tree invariant check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub nodes: usize,
    pub roots: usize,
    pub violations: Vec<Violation>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every global nested-set invariant over the whole node set.
///
/// Single sweep in `lft` order keeping a stack of open intervals: the top of
/// the stack after popping closed intervals is the nearest enclosing node.
#[instrument(level = "debug", skip(nodes), fields(count = nodes.len()))]
pub fn validate(nodes: &[Node]) -> ConsistencyReport {
    let mut violations = Vec::new();

    for node in nodes {
        if node.lft >= node.rgt {
            violations.push(Violation::EmptyInterval { id: node.id });
        } else if (node.rgt - node.lft - 1) % SLOT_WIDTH != 0 {
            violations.push(Violation::UnevenSpan { id: node.id });
        }
    }

    let boundaries = nodes
        .iter()
        .flat_map(|n| [(n.lft, n.id), (n.rgt, n.id)])
        .sorted();
    for ((a, first), (b, second)) in boundaries.tuple_windows() {
        if a == b {
            violations.push(Violation::DuplicateBoundary {
                value: a,
                first,
                second,
            });
        }
    }

    let mut roots = 0;
    let mut open: Vec<&Node> = Vec::new();
    for node in nodes.iter().sorted_by_key(|n| (n.lft, n.id)) {
        while open.last().is_some_and(|top| top.rgt <= node.lft) {
            open.pop();
        }
        match open.last() {
            None => roots += 1,
            Some(parent) => {
                if node.rgt >= parent.rgt {
                    violations.push(Violation::PartialOverlap {
                        outer: parent.id,
                        inner: node.id,
                    });
                } else if node.level != parent.level + 1 {
                    violations.push(Violation::LevelMismatch {
                        id: node.id,
                        parent: parent.id,
                        expected: parent.level + 1,
                        actual: node.level,
                    });
                }
            }
        }
        open.push(node);
    }

    debug!(roots, violations = violations.len(), "validated nested set");
    ConsistencyReport {
        nodes: nodes.len(),
        roots,
        violations,
    }
}
