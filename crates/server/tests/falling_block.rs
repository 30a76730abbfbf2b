//! Single-call behavior of the falling-block evaluator.

mod common;

use common::{Effect, TestWorld, sand, stone, water};
use riverbed_engine::access::BlockUpdate;
use riverbed_engine::rules::Rule;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;
use riverbed_server::block;
use riverbed_server::registry::TableRegistry;
use riverbed_server::rules::falling_block::FallingBlocks;

const P: BlockPos = BlockPos::new(3, 6, 3);

fn evaluator() -> FallingBlocks<TableRegistry> {
    FallingBlocks::new(TableRegistry::standard())
}

#[test]
fn sand_over_air_becomes_a_falling_block() {
    let mut world = TestWorld::new();
    world.place(P, sand());

    let handled = evaluator().try_fall(&mut world, &BlockUpdate::with_block(P, sand()));

    assert!(handled);
    assert_eq!(
        world.effects(),
        [Effect::Set(P, BlockId::AIR), Effect::Spawn(P, sand())]
    );
    assert_eq!(world.block(P), Some(BlockId::AIR));
}

#[test]
fn sand_over_stone_stays() {
    let mut world = TestWorld::new();
    world.place(P, sand()).place(P.down(), stone());

    let handled = evaluator().try_fall(&mut world, &BlockUpdate::with_block(P, sand()));

    assert!(!handled);
    assert!(world.effects().is_empty());
    assert_eq!(world.block(P), Some(sand()));
}

#[test]
fn sand_sinks_through_liquid_and_plants() {
    for below in [water(0), water(9), block::SHORT_GRASS.default_block()] {
        let mut world = TestWorld::new();
        world.place(P, sand()).place(P.down(), below);

        assert!(evaluator().try_fall(&mut world, &BlockUpdate::with_block(P, sand())));
        assert_eq!(world.effects()[1], Effect::Spawn(P, sand()));
    }
}

#[test]
fn spawn_carries_the_original_material() {
    let gravel = block::GRAVEL.default_block();
    let mut world = TestWorld::new();
    world.place(P, gravel);

    assert!(evaluator().try_fall(&mut world, &BlockUpdate::with_block(P, gravel)));
    assert!(world.effects().contains(&Effect::Spawn(P, gravel)));
}

#[test]
fn update_without_block_is_a_guarded_no_op() {
    let mut world = TestWorld::new();
    world.place(P, sand());

    let handled = evaluator().try_fall(&mut world, &BlockUpdate::at(P));

    assert!(!handled);
    assert!(world.effects().is_empty());
    assert_eq!(world.reads(), 0);
}

#[test]
fn unloaded_cell_below_gives_no_support_change() {
    let mut world = TestWorld::new();
    let bottom = BlockPos::new(0, 0, 0);
    world.place(bottom, sand());

    assert!(!evaluator().try_fall(&mut world, &BlockUpdate::with_block(bottom, sand())));
    assert!(world.effects().is_empty());
}

#[test]
fn rule_only_drops_materials_with_gravity() {
    let mut world = TestWorld::new();
    world.place(P, stone());

    let rule = evaluator();
    assert!(!rule.evaluate(&mut world, &BlockUpdate::with_block(P, stone())));
    assert!(world.effects().is_empty());

    world.place(P, sand());
    assert!(rule.evaluate(&mut world, &BlockUpdate::with_block(P, sand())));
    assert_eq!(world.effects().len(), 2);
}
