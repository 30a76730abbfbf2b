//! Liquid propagation as a per-update state machine.
//!
//! One call looks at one liquid cell and its immediate neighborhood, makes at
//! most a handful of writes, and schedules every cell that must be looked at
//! next. A flood spreads one ring per wave of the dispatcher; nothing here
//! loops or recurses.
//!
//! Order within a call:
//!
//! 1. A source probes for a nearby drop and, if it finds one on only some
//!    sides, sends its flow there first.
//! 2. A falling cell checks its feed from above and keeps falling, or lands
//!    and becomes level 1.
//! 3. A resting cell may be promoted to a source, may dry up, prefers to flow
//!    down, and otherwise spreads sideways one level weaker.

use riverbed_engine::access::{BlockUpdate, WorldAccess};
use riverbed_engine::rules::Rule;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;

use super::helpers;
use crate::block::{self, Material};
use crate::fluid::FluidState;
use crate::registry::BlockRegistry;

/// A falling column that hit something solid.
const LANDED: FluidState = FluidState::from_raw(1);

pub struct FluidFlow<R> {
    registry: R,
}

impl<R: BlockRegistry> FluidFlow<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Evaluate one liquid cell. Returns `true` only when the cell settled
    /// itself (promoted, dried up, or lost its feed); propagation that
    /// continues through scheduled updates returns `false`.
    pub fn step<W: WorldAccess + ?Sized>(&self, world: &mut W, update: &BlockUpdate) -> bool {
        let Some(current) = update.resolve(world) else {
            return false;
        };
        let material = block::material(current);
        if !self.registry.is_liquid(material) {
            return false;
        }
        let pos = update.pos;
        let mut state = FluidState::of(current);

        if state.is_source() {
            if let (Some(outlet), Some(next)) = (self.find_outlet(world, pos), state.weakened()) {
                tracing::trace!(?pos, ?outlet, "source flows toward drop");
                world.set_block(outlet, self.liquid(material, next));
                world.schedule_update(BlockUpdate::at(outlet));
                return false;
            }
        }

        if state.is_falling() {
            let fed = world
                .get_block(pos.up())
                .is_some_and(|above| self.registry.is_liquid(block::material(above)));
            if !fed {
                tracing::trace!(?pos, "falling column lost its feed");
                world.set_block(pos, BlockId::AIR);
                world.schedule_update(BlockUpdate::at(pos.down()));
                return true;
            }

            let below = pos.down();
            if helpers::is_replaceable(&self.registry, world, below) {
                world.set_block(below, self.liquid(material, state));
                world.schedule_update(BlockUpdate::at(below));
                return false;
            }

            // Landed. The rest of this call spreads from the new state.
            state = LANDED;
            world.set_block_untracked(pos, self.liquid(material, state));
        }

        self.spread(world, pos, self.liquid(material, state))
    }

    /// First horizontal neighbor (forward, backward, left, right) that is
    /// open and has an open cell beneath it, provided some but not all four
    /// sides qualify. A one-cell lookahead, not pathfinding.
    fn find_outlet<W: WorldAccess + ?Sized>(&self, world: &W, pos: BlockPos) -> Option<BlockPos> {
        let mut outlets = pos.horizontal_neighbors().into_iter().filter(|n| {
            helpers::is_open(&self.registry, world, *n)
                && helpers::is_open(&self.registry, world, n.down())
        });
        let first = outlets.next()?;
        let count = 1 + outlets.count();
        (count < 4).then_some(first)
    }

    fn spread<W: WorldAccess + ?Sized>(&self, world: &mut W, pos: BlockPos, here: BlockId) -> bool {
        let material = block::material(here);
        let state = FluidState::of(here);
        let level = state.level();
        let neighbors = pos.horizontal_neighbors().map(|n| (n, world.get_block(n)));
        let same_levels = || {
            neighbors
                .iter()
                .filter_map(|(_, b)| b.filter(|b| block::same_material(*b, here)))
                .map(FluidState::of)
        };

        // Flowing water between two sources becomes a source.
        if level == 1 && same_levels().filter(|s| s.is_source()).count() > 1 {
            tracing::trace!(?pos, "promoted to source");
            world.set_block(pos, self.liquid(material, FluidState::SOURCE));
            return true;
        }

        // Nothing stronger beside it and nothing feeding from above. Sides
        // holding anything else read as level 0, so a cell with no
        // same-material neighbor never starves.
        if level > 0 {
            let strongest = same_levels().map(FluidState::level).min().unwrap_or(0);
            let fed_from_above = world
                .get_block(pos.up())
                .is_some_and(|above| block::same_material(above, here));
            if strongest >= level && !fed_from_above {
                tracing::trace!(?pos, level, "flow dried up");
                world.set_block(pos, BlockId::AIR);
                return true;
            }
        }

        let below = pos.down();
        match world.get_block(below) {
            Some(b) if block::same_material(b, here) => return false,
            Some(b) if self.registry.is_replaceable_by_fluid(block::material(b)) => {
                if let Some(falling) = FluidState::falling(level) {
                    world.set_block(below, self.liquid(material, falling));
                    world.schedule_update(BlockUpdate::at(below));
                }
                return false;
            }
            _ => {}
        }

        let Some(next) = state.weakened() else {
            return false;
        };
        for (neighbor, occupant) in neighbors {
            let Some(occupant) = occupant else {
                continue;
            };
            let weaker = block::same_material(occupant, here)
                && FluidState::of(occupant).level() > next.level();
            if weaker || self.registry.is_replaceable_by_fluid(block::material(occupant)) {
                world.set_block(neighbor, self.liquid(material, next));
                world.schedule_update(BlockUpdate::at(neighbor));
            }
        }
        false
    }

    fn liquid(&self, material: Material, state: FluidState) -> BlockId {
        self.registry.block_for(material, state.raw())
    }
}

impl<R: BlockRegistry> Rule for FluidFlow<R> {
    fn name(&self) -> &'static str {
        "fluid_flow"
    }

    fn evaluate(&self, world: &mut dyn WorldAccess, update: &BlockUpdate) -> bool {
        self.step(world, update)
    }
}
