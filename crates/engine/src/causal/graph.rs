use std::fmt::Write as _;

use super::event::{Event, EventId, EventPayload};
use slotmap::SlotMap;

/// A node in the causal DAG.
#[derive(Debug)]
pub struct EventNode {
    pub event: Event,
    pub parents: Vec<EventId>,
    pub children: Vec<EventId>,
    pub executed: bool,
    /// Parents that have not executed yet. Zero means runnable.
    waiting_on: usize,
}

/// Append-only DAG of block updates.
///
/// A child only becomes runnable once every parent has executed, so an
/// update always sees the writes of the evaluation that raised it. Nodes with
/// no ancestry between them may run in any order, or concurrently.
pub struct CausalGraph {
    nodes: SlotMap<EventId, EventNode>,
    executed: usize,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            executed: 0,
        }
    }

    /// Add `event` as a consequence of `parents`. Parents that are unknown or
    /// already executed do not hold it back.
    pub fn insert(&mut self, event: Event, parents: Vec<EventId>) -> EventId {
        let waiting_on = parents
            .iter()
            .filter(|p| self.nodes.get(**p).is_some_and(|n| !n.executed))
            .count();
        let id = self.nodes.insert(EventNode {
            event,
            parents: parents.clone(),
            children: Vec::new(),
            executed: false,
            waiting_on,
        });

        for parent in parents {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.push(id);
            }
        }
        id
    }

    /// Insert an event raised from outside any cascade (a world edit).
    pub fn insert_root(&mut self, event: Event) -> EventId {
        self.insert(event, Vec::new())
    }

    /// Runnable events, in insertion order.
    pub fn frontier(&self) -> Vec<EventId> {
        self.nodes
            .iter()
            .filter(|(_, node)| !node.executed && node.waiting_on == 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Mark `id` as run and release its children. Marking twice is a no-op.
    pub fn mark_executed(&mut self, id: EventId) {
        let children = match self.nodes.get_mut(id) {
            Some(node) if !node.executed => {
                node.executed = true;
                node.children.clone()
            }
            _ => return,
        };
        self.executed += 1;
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.waiting_on = node.waiting_on.saturating_sub(1);
            }
        }
    }

    pub fn get(&self, id: EventId) -> Option<&EventNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn executed_count(&self) -> usize {
        self.executed
    }

    /// Payloads of every executed event, in insertion order.
    pub fn executed(&self) -> impl Iterator<Item = &EventPayload> + '_ {
        self.nodes
            .values()
            .filter(|node| node.executed)
            .map(|node| &node.event.payload)
    }

    /// Events that have not run yet, in insertion order. After a capped run
    /// these are the updates still owed to the world.
    pub fn pending(&self) -> impl Iterator<Item = &Event> + '_ {
        self.nodes
            .values()
            .filter(|node| !node.executed)
            .map(|node| &node.event)
    }

    /// Graphviz DOT, children pointing at their parents. Pending nodes are
    /// drawn grey.
    pub fn to_dot(&self) -> String {
        let mut out = String::from(
            "digraph causal {\n  rankdir=BT;\n  node [shape=box, fontname=\"monospace\", fontsize=10];\n",
        );
        for (id, node) in &self.nodes {
            let (label, color) = dot_label(&node.event.payload);
            let fill = if node.executed { color } else { "#f8f9fa" };
            let _ = writeln!(
                out,
                "  \"{id:?}\" [label=\"{label}\", style=filled, fillcolor=\"{fill}\"];"
            );
            for parent in &node.parents {
                let _ = writeln!(out, "  \"{parent:?}\" -> \"{id:?}\";");
            }
        }
        out.push_str("}\n");
        out
    }
}

fn dot_label(payload: &EventPayload) -> (String, &'static str) {
    let p = payload.pos();
    let at = format!("({},{},{})", p.x, p.y, p.z);
    match payload {
        EventPayload::BlockSet { new, .. } => (format!("Set {at}\\n-> {new:?}"), "#d4edda"),
        EventPayload::BlockSetUntracked { new, .. } => {
            (format!("Set* {at}\\n-> {new:?}"), "#cce5ff")
        }
        EventPayload::BlockNotify { .. } => (format!("Notify {at}"), "#fff3cd"),
        EventPayload::SpawnFallingBlock { block, .. } => {
            (format!("Fall {at}\\n{block:?}"), "#f8d7da")
        }
    }
}

impl Default for CausalGraph {
    fn default() -> Self {
        Self::new()
    }
}
