//! Gravity for loose blocks (sand, gravel).
//!
//! An unsupported block leaves the grid and becomes a falling entity; where
//! it lands is the entity layer's business, not ours.

use riverbed_engine::access::{BlockUpdate, WorldAccess};
use riverbed_engine::rules::Rule;
use riverbed_engine::world::block::BlockId;

use super::helpers;
use crate::block;
use crate::registry::BlockRegistry;

pub struct FallingBlocks<R> {
    registry: R,
}

impl<R: BlockRegistry> FallingBlocks<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Convert the update's block into a falling entity if the cell below is
    /// fluid-replaceable or liquid.
    ///
    /// An update without a pre-resolved block is ignored: this never reads
    /// the position itself.
    pub fn try_fall<W: WorldAccess + ?Sized>(&self, world: &mut W, update: &BlockUpdate) -> bool {
        let Some(falling) = update.block else {
            return false;
        };
        if !helpers::is_open(&self.registry, world, update.pos.down()) {
            return false;
        }

        tracing::trace!(pos = ?update.pos, ?falling, "block lost support");
        world.set_block(update.pos, BlockId::AIR);
        world.spawn_falling_block(update.pos, falling);
        true
    }
}

impl<R: BlockRegistry> Rule for FallingBlocks<R> {
    fn name(&self) -> &'static str {
        "falling_block"
    }

    fn evaluate(&self, world: &mut dyn WorldAccess, update: &BlockUpdate) -> bool {
        match update.block {
            Some(b) if self.registry.has_gravity(block::material(b)) => self.try_fall(world, update),
            _ => false,
        }
    }
}
