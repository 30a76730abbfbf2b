//! World-change bus: every cascade publishes what it did to the grid and
//! which blocks it handed to the entity layer.
//!
//! Batches travel on a `tokio::sync::broadcast` channel; subscribers (the
//! entity layer, client sync, logging) receive them independently.

use std::sync::Arc;

use riverbed_engine::causal::event::EventPayload;
use riverbed_engine::causal::graph::CausalGraph;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;

/// Recommended capacity for the broadcast channel.
pub const BUS_CAPACITY: usize = 256;

/// Everything one cascade did, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// `(position, new block)` for every executed write, tracked or not.
    pub changes: Vec<(BlockPos, BlockId)>,
    /// `(position, block)` for every falling-block spawn request.
    pub spawns: Vec<(BlockPos, BlockId)>,
}

impl CascadeOutcome {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.spawns.is_empty()
    }

    pub fn into_batch(self, source: &'static str) -> WorldChangeBatch {
        WorldChangeBatch {
            source,
            changes: self.changes.into(),
            spawns: self.spawns.into(),
        }
    }
}

/// One cascade's outcome as published on the bus.
///
/// `Arc<[...]>` so cloning per subscriber is a refcount bump.
#[derive(Clone, Debug)]
pub struct WorldChangeBatch {
    /// Name of the layer that raised the cascade.
    pub source: &'static str,
    pub changes: Arc<[(BlockPos, BlockId)]>,
    pub spawns: Arc<[(BlockPos, BlockId)]>,
}

/// Extract the executed writes and spawn requests from a causal graph.
pub fn collect_outcome(graph: &CausalGraph) -> CascadeOutcome {
    let mut outcome = CascadeOutcome::default();
    for payload in graph.executed() {
        match payload {
            EventPayload::BlockSet { pos, new, .. }
            | EventPayload::BlockSetUntracked { pos, new, .. } => {
                outcome.changes.push((*pos, *new));
            }
            EventPayload::SpawnFallingBlock { pos, block } => {
                outcome.spawns.push((*pos, *block));
            }
            EventPayload::BlockNotify { .. } => {}
        }
    }
    outcome
}
