//! # Dependency graph over devices.
//!
//! A directed multigraph: every queued MOVE contributes one edge
//! `source ─► destination`, labelled with the transfer id. An edge lives
//! exactly as long as its transfer sits in a wait queue.
//!
//! A ring is a directed cycle. Because every cycle is resolved the moment it
//! appears, the graph is acyclic before each insertion, so a cycle found after
//! inserting `from ─► to` always passes through `from`. [`DependencyGraph::find_ring`]
//! therefore only searches for cycles through one start device.
//!
//! ```text
//!   DEV-1 ──T-4──► DEV-2
//!     ▲              │
//!     └────T-6──── DEV-3 ◄──T-5── (from DEV-2)
//!
//!   find_ring(DEV-1) = devices [DEV-1, DEV-2, DEV-3], members [T-4, T-5, T-6]
//! ```

use std::collections::{HashMap, HashSet};

use crate::ids::{DeviceId, TransferId};

#[derive(Clone, Copy, Debug)]
struct Edge {
    transfer: TransferId,
    to: DeviceId,
}

/// A directed cycle of blocked moves.
///
/// `members[i]` moves from `devices[i]` to `devices[(i + 1) % n]`, so it
/// takes the slot vacated by `members[(i + 1) % n]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Ring {
    pub(crate) devices: Vec<DeviceId>,
    pub(crate) members: Vec<TransferId>,
}

#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    out: HashMap<DeviceId, Vec<Edge>>,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, transfer: TransferId, from: DeviceId, to: DeviceId) {
        self.out.entry(from).or_default().push(Edge { transfer, to });
    }

    /// Removes the edge labelled `transfer` leaving `from`. Returns whether it existed.
    pub(crate) fn remove(&mut self, transfer: TransferId, from: DeviceId) -> bool {
        let Some(edges) = self.out.get_mut(&from) else {
            return false;
        };
        let before = edges.len();
        edges.retain(|e| e.transfer != transfer);
        let removed = edges.len() != before;
        if edges.is_empty() {
            self.out.remove(&from);
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, transfer: TransferId) -> bool {
        self.out
            .values()
            .any(|edges| edges.iter().any(|e| e.transfer == transfer))
    }

    pub(crate) fn len(&self) -> usize {
        self.out.values().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Depth-first search for a directed cycle through `start`.
    ///
    /// Each device is expanded at most once, so the search is bounded by the
    /// number of devices plus the number of edges.
    pub(crate) fn find_ring(&self, start: DeviceId) -> Option<Ring> {
        let mut visited: HashSet<DeviceId> = HashSet::new();
        let mut parent: HashMap<DeviceId, (DeviceId, TransferId)> = HashMap::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            for edge in self.out.get(&node).into_iter().flatten() {
                if edge.to == start {
                    return unwind(start, node, edge.transfer, &parent);
                }
                if !visited.contains(&edge.to) {
                    parent.insert(edge.to, (node, edge.transfer));
                    stack.push(edge.to);
                }
            }
        }
        None
    }
}

/// Rebuilds the ring from the parent map, closing edge `last ─► start` included.
fn unwind(
    start: DeviceId,
    last: DeviceId,
    closing: TransferId,
    parent: &HashMap<DeviceId, (DeviceId, TransferId)>,
) -> Option<Ring> {
    let mut devices = vec![last];
    let mut members = vec![closing];
    let mut cur = last;
    while cur != start {
        let &(prev, via) = parent.get(&cur)?;
        devices.push(prev);
        members.push(via);
        cur = prev;
    }
    devices.reverse();
    members.reverse();
    Some(Ring { devices, members })
}
