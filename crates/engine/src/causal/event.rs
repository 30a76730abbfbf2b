use crate::world::block::BlockId;
use crate::world::position::{BlockPos, ChunkPos};
use slotmap::new_key_type;

new_key_type! {
    /// Unique handle for a node in the causal graph.
    pub struct EventId;
}

/// A single, atomic effect on the world -- the unit of causality.
#[derive(Debug, Clone)]
pub struct Event {
    pub payload: EventPayload,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// A block was written and the change is announced: the position is
    /// re-evaluated with `new` and its neighbors are notified.
    BlockSet {
        pos: BlockPos,
        old: BlockId,
        new: BlockId,
    },

    /// A block was written silently. Nothing is re-evaluated.
    BlockSetUntracked {
        pos: BlockPos,
        old: BlockId,
        new: BlockId,
    },

    /// Re-evaluate whatever occupies `pos` when this runs.
    BlockNotify { pos: BlockPos },

    /// `block` left the grid at `pos` and should continue as a falling
    /// entity. The engine only records the request.
    SpawnFallingBlock { pos: BlockPos, block: BlockId },
}

impl EventPayload {
    pub const fn pos(&self) -> BlockPos {
        match self {
            EventPayload::BlockSet { pos, .. }
            | EventPayload::BlockSetUntracked { pos, .. }
            | EventPayload::BlockNotify { pos }
            | EventPayload::SpawnFallingBlock { pos, .. } => *pos,
        }
    }
}

impl Event {
    pub const fn new(payload: EventPayload) -> Self {
        Self { payload }
    }

    pub const fn pos(&self) -> BlockPos {
        self.payload.pos()
    }

    /// The chunk this event primarily affects (used for parallel grouping).
    pub const fn chunk(&self) -> ChunkPos {
        self.payload.pos().chunk()
    }
}
