use std::sync::Arc;
use std::time::Duration;

use riverbed_engine::causal::event::{Event, EventPayload};
use riverbed_engine::world::World;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;
use riverbed_server::block;
use riverbed_server::config::SchedulerConfig;
use riverbed_server::event_bus;
use riverbed_server::fluid::FluidState;
use riverbed_server::metrics::Metrics;
use riverbed_server::registry::TableRegistry;
use riverbed_server::simulation::{self, Backlog, ScriptedEdit, ScriptedEdits, SimulationLayer};
use riverbed_server::worldgen::generate_flat_world;

fn flat_world() -> World {
    let world = World::new();
    generate_flat_world(&world, 1, &[block::BEDROCK, block::DIRT]);
    world
}

#[test]
fn flat_world_layers_start_at_zero() {
    let world = flat_world();
    assert_eq!(world.chunk_count(), 4);
    assert_eq!(world.get_block(BlockPos::new(0, 0, 0)), block::BEDROCK.default_block());
    assert_eq!(world.get_block(BlockPos::new(-1, 1, -1)), block::DIRT.default_block());
    assert_eq!(world.get_block(BlockPos::new(5, 2, 5)), BlockId::AIR);
}

#[test]
fn scripted_edits_fire_on_their_tick() {
    let world = flat_world();
    let sand = block::SAND.default_block();
    let layer = ScriptedEdits::new(
        vec![
            ScriptedEdit { tick: 2, pos: BlockPos::new(1, 1, 1), block: BlockId::AIR },
            ScriptedEdit { tick: 0, pos: BlockPos::new(3, 8, 3), block: sand },
        ],
        Duration::from_millis(50),
    );

    let first = layer.generate_events(&world);
    assert_eq!(first.len(), 1);
    assert_eq!(
        first[0].payload,
        EventPayload::BlockSet { pos: BlockPos::new(3, 8, 3), old: BlockId::AIR, new: sand }
    );

    assert!(layer.generate_events(&world).is_empty());
    assert!(!layer.is_finished());

    let third = layer.generate_events(&world);
    assert_eq!(
        third[0].payload,
        EventPayload::BlockSet {
            pos: BlockPos::new(1, 1, 1),
            old: block::DIRT.default_block(),
            new: BlockId::AIR,
        }
    );
    assert!(layer.is_finished());
}

#[test]
fn cascade_outcome_feeds_metrics() {
    let world = flat_world();
    let rules = riverbed_server::rules::standard(Arc::new(TableRegistry::standard()));
    let layer = ScriptedEdits::new(
        vec![ScriptedEdit {
            tick: 0,
            pos: BlockPos::new(3, 8, 3),
            block: block::GRAVEL.default_block(),
        }],
        Duration::from_millis(50),
    );

    for parallel in [false, true] {
        let settings = SchedulerConfig { parallel, ..SchedulerConfig::default() };
        let world = flat_world();
        let roots = ScriptedEdits::new(
            vec![ScriptedEdit {
                tick: 0,
                pos: BlockPos::new(3, 8, 3),
                block: block::GRAVEL.default_block(),
            }],
            Duration::from_millis(50),
        )
        .generate_events(&world);
        let (graph, executed) = simulation::run_cascade(&world, &rules, &settings, roots);
        assert_eq!(executed, graph.len());
        assert_eq!(event_bus::collect_outcome(&graph).spawns.len(), 1);
    }

    let (graph, executed) = simulation::run_cascade(
        &world,
        &rules,
        &SchedulerConfig::default(),
        layer.generate_events(&world),
    );
    let outcome = event_bus::collect_outcome(&graph);
    let metrics = Metrics::new();
    metrics.record_cascade(executed as u64, Duration::from_micros(20), &outcome);

    let snapshot = metrics.snapshot(world.chunk_count() as u64);
    assert_eq!(snapshot.cascades_total, 1);
    assert_eq!(snapshot.events_total, executed as u64);
    assert_eq!(snapshot.block_writes, 2);
    assert_eq!(snapshot.falling_spawns, 1);
    assert_eq!(snapshot.hist, [0, 0, 1, 0, 0]);
    assert_eq!(snapshot.chunks_loaded, 4);

    let batch = outcome.into_batch(layer.name());
    assert_eq!(batch.source, "scripted_edits");
    assert_eq!(batch.spawns.len(), 1);
}

#[test]
fn capped_cascade_resumes_on_later_ticks() {
    let world = flat_world();
    let rules = riverbed_server::rules::standard(Arc::new(TableRegistry::standard()));
    let settings = SchedulerConfig { max_steps: 3, ..SchedulerConfig::default() };
    let spring = BlockPos::new(0, 2, 0);
    let water = FluidState::SOURCE.block(block::WATER);

    let mut backlog = Backlog::default();
    let (graph, _) = backlog.run(
        &world,
        &rules,
        &settings,
        vec![Event::new(EventPayload::BlockSet { pos: spring, old: BlockId::AIR, new: water })],
    );
    assert!(!graph.frontier().is_empty());
    assert_eq!(backlog.len(), graph.pending().count());

    let mut ticks = 1;
    while !backlog.is_empty() {
        assert!(ticks < 1_000, "pool never settled");
        backlog.run(&world, &rules, &settings, Vec::new());
        ticks += 1;
    }
    assert!(ticks > 1);

    // Same pool a single uncapped cascade settles into.
    for dx in -8i64..=8 {
        for dz in -8i64..=8 {
            let b = world.get_block(spring.offset(dx, 0, dz));
            let distance = (dx.abs() + dz.abs()) as u8;
            if distance <= FluidState::MAX_LEVEL {
                assert_eq!(block::material(b), block::WATER, "expected water at ({dx}, {dz})");
                assert_eq!(FluidState::of(b).level(), distance, "level at ({dx}, {dz})");
            } else {
                assert_eq!(b, BlockId::AIR, "water past reach at ({dx}, {dz})");
            }
        }
    }
}

#[test]
fn empty_backlog_with_no_roots_runs_nothing() {
    let world = flat_world();
    let rules = riverbed_server::rules::standard(Arc::new(TableRegistry::standard()));

    let mut backlog = Backlog::default();
    let (graph, executed) = backlog.run(&world, &rules, &SchedulerConfig::default(), Vec::new());

    assert_eq!(executed, 0);
    assert!(graph.is_empty());
    assert!(backlog.is_empty());
}
