//! A recording `WorldAccess` for driving the evaluators one call at a time.
//!
//! Positions inside the loaded box read as stone at or below `ground`, air
//! above it, unless overridden with `place`. Writes apply immediately and
//! every effect is logged in call order.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use riverbed_engine::access::{BlockUpdate, WorldAccess};
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;
use riverbed_server::block::{self, Material};
use riverbed_server::fluid::FluidState;

/// Loaded box: |x|, |z| <= LOADED_RADIUS and 0 <= y < LOADED_HEIGHT.
pub const LOADED_RADIUS: i64 = 16;
pub const LOADED_HEIGHT: i64 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Set(BlockPos, BlockId),
    SetUntracked(BlockPos, BlockId),
    Schedule(BlockPos),
    Spawn(BlockPos, BlockId),
}

pub struct TestWorld {
    blocks: HashMap<BlockPos, BlockId>,
    ground: i64,
    reads: Cell<usize>,
    effects: Vec<Effect>,
}

impl TestWorld {
    /// Stone up to and including y=4.
    pub fn new() -> Self {
        Self::with_ground(4)
    }

    pub fn with_ground(ground: i64) -> Self {
        Self {
            blocks: HashMap::new(),
            ground,
            reads: Cell::new(0),
            effects: Vec::new(),
        }
    }

    /// Set a block without logging an effect.
    pub fn place(&mut self, pos: BlockPos, block: BlockId) -> &mut Self {
        self.blocks.insert(pos, block);
        self
    }

    /// Peek without counting a read.
    pub fn block(&self, pos: BlockPos) -> Option<BlockId> {
        self.lookup(pos)
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn lookup(&self, pos: BlockPos) -> Option<BlockId> {
        let loaded = pos.x.abs() <= LOADED_RADIUS
            && pos.z.abs() <= LOADED_RADIUS
            && (0..LOADED_HEIGHT).contains(&pos.y);
        if !loaded {
            return None;
        }
        let fallback = if pos.y <= self.ground {
            block::STONE.default_block()
        } else {
            BlockId::AIR
        };
        Some(self.blocks.get(&pos).copied().unwrap_or(fallback))
    }
}

impl WorldAccess for TestWorld {
    fn get_block(&self, pos: BlockPos) -> Option<BlockId> {
        self.reads.set(self.reads.get() + 1);
        self.lookup(pos)
    }

    fn set_block(&mut self, pos: BlockPos, block: BlockId) {
        self.blocks.insert(pos, block);
        self.effects.push(Effect::Set(pos, block));
    }

    fn set_block_untracked(&mut self, pos: BlockPos, block: BlockId) {
        self.blocks.insert(pos, block);
        self.effects.push(Effect::SetUntracked(pos, block));
    }

    fn schedule_update(&mut self, update: BlockUpdate) {
        self.effects.push(Effect::Schedule(update.pos));
    }

    fn spawn_falling_block(&mut self, pos: BlockPos, block: BlockId) {
        self.effects.push(Effect::Spawn(pos, block));
    }
}

/// `material` carrying the raw fluid payload `raw` (level, plus 8 if falling).
pub fn liquid(material: Material, raw: u8) -> BlockId {
    FluidState::from_raw(raw).block(material)
}

pub fn water(raw: u8) -> BlockId {
    liquid(block::WATER, raw)
}

pub fn stone() -> BlockId {
    block::STONE.default_block()
}

pub fn sand() -> BlockId {
    block::SAND.default_block()
}
