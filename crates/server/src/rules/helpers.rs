//! Neighborhood predicates shared by the block-update rules.

use riverbed_engine::access::WorldAccess;
use riverbed_engine::world::position::BlockPos;

use crate::block;
use crate::registry::BlockRegistry;

/// The occupant of `pos` may be washed away by a liquid. Absent positions
/// are never replaceable.
pub fn is_replaceable<R, W>(registry: &R, world: &W, pos: BlockPos) -> bool
where
    R: BlockRegistry + ?Sized,
    W: WorldAccess + ?Sized,
{
    world
        .get_block(pos)
        .is_some_and(|b| registry.is_replaceable_by_fluid(block::material(b)))
}

/// The occupant of `pos` is fluid-replaceable or already a liquid: a block
/// or a liquid can move into it. Absent positions are closed.
pub fn is_open<R, W>(registry: &R, world: &W, pos: BlockPos) -> bool
where
    R: BlockRegistry + ?Sized,
    W: WorldAccess + ?Sized,
{
    world.get_block(pos).is_some_and(|b| {
        let material = block::material(b);
        registry.is_replaceable_by_fluid(material) || registry.is_liquid(material)
    })
}
