//! The world access port: everything a block-update rule may do to the world.
//!
//! Rules are written against [`WorldAccess`] and never see the storage or the
//! work queue behind it. [`Cascade`] is the implementation the causal
//! scheduler hands to rules; tests substitute their own.

use std::collections::HashMap;

use crate::causal::event::{Event, EventPayload};
use crate::world::block::BlockId;
use crate::world::position::BlockPos;
use crate::world::World;

/// One unit of work: "re-evaluate this position".
///
/// `block` is an optional pre-resolved snapshot of the occupant. When it is
/// `None` a rule that needs the block reads it through the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockUpdate {
    pub pos: BlockPos,
    pub block: Option<BlockId>,
}

impl BlockUpdate {
    /// An update that resolves its block lazily.
    pub const fn at(pos: BlockPos) -> Self {
        Self { pos, block: None }
    }

    pub const fn with_block(pos: BlockPos, block: BlockId) -> Self {
        Self {
            pos,
            block: Some(block),
        }
    }

    /// The pre-resolved block, or the world's current occupant. `None` when
    /// the position is outside the loaded area.
    pub fn resolve<W: WorldAccess + ?Sized>(&self, world: &W) -> Option<BlockId> {
        self.block.or_else(|| world.get_block(self.pos))
    }
}

/// Capabilities a rule has over the shared world.
pub trait WorldAccess {
    /// Current occupant of `pos`, or `None` outside the loaded area.
    fn get_block(&self, pos: BlockPos) -> Option<BlockId>;

    /// Write `block` and raise a change notification for `pos`.
    fn set_block(&mut self, pos: BlockPos, block: BlockId);

    /// Write `block` without raising any notification.
    fn set_block_untracked(&mut self, pos: BlockPos, block: BlockId);

    /// Ask for `update` to be evaluated later. Timing is up to the dispatcher.
    fn schedule_update(&mut self, update: BlockUpdate);

    /// Hand `block` at `pos` over to the entity layer as a falling block.
    fn spawn_falling_block(&mut self, pos: BlockPos, block: BlockId);
}

/// [`WorldAccess`] over a [`World`] that records every effect as a causal
/// event instead of applying it.
///
/// Reads see the writes already made through the same `Cascade`, so a rule
/// observes its own effects. The scheduler turns the recorded events into
/// children of the event being executed; nothing reaches the world until they
/// run.
pub struct Cascade<'w> {
    world: &'w World,
    pending: HashMap<BlockPos, BlockId>,
    events: Vec<Event>,
}

impl<'w> Cascade<'w> {
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            pending: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Events recorded so far, in emission order.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Record a write, unless it would leave `pos` as it is.
    fn record_write(&mut self, pos: BlockPos, new: BlockId, tracked: bool) {
        let old = self.get_block(pos).unwrap_or(BlockId::AIR);
        if old == new {
            tracing::trace!(?pos, ?new, "dropping no-op write");
            return;
        }
        self.pending.insert(pos, new);
        let payload = if tracked {
            EventPayload::BlockSet { pos, old, new }
        } else {
            EventPayload::BlockSetUntracked { pos, old, new }
        };
        self.events.push(Event { payload });
    }
}

impl WorldAccess for Cascade<'_> {
    fn get_block(&self, pos: BlockPos) -> Option<BlockId> {
        match self.pending.get(&pos) {
            Some(block) => Some(*block),
            None => self.world.try_get_block(pos),
        }
    }

    fn set_block(&mut self, pos: BlockPos, block: BlockId) {
        self.record_write(pos, block, true);
    }

    fn set_block_untracked(&mut self, pos: BlockPos, block: BlockId) {
        self.record_write(pos, block, false);
    }

    fn schedule_update(&mut self, update: BlockUpdate) {
        // The snapshot would be stale by the time the update runs; the
        // scheduler re-reads the block at execution.
        self.events.push(Event {
            payload: EventPayload::BlockNotify { pos: update.pos },
        });
    }

    fn spawn_falling_block(&mut self, pos: BlockPos, block: BlockId) {
        self.events.push(Event {
            payload: EventPayload::SpawnFallingBlock { pos, block },
        });
    }
}
