//! Benchmark: sequential vs parallel scheduler.
//!
//! Drops sand and pours one water source per chunk across a grid of chunks,
//! then measures time to quiescence.
//! Run with: `cargo run --release -p riverbed-server --example bench_parallel`

use std::sync::Arc;
use std::time::Instant;

use riverbed_engine::causal::event::{Event, EventPayload};
use riverbed_engine::causal::graph::CausalGraph;
use riverbed_engine::causal::scheduler::Scheduler;
use riverbed_engine::world::World;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;

use riverbed_server::block;
use riverbed_server::event_bus;
use riverbed_server::fluid::FluidState;
use riverbed_server::registry::TableRegistry;
use riverbed_server::worldgen::generate_flat_world;

const LAYERS: [block::Material; 5] = [
    block::BEDROCK,
    block::STONE,
    block::STONE,
    block::STONE,
    block::DIRT,
];
const SURFACE: i64 = 5;

fn main() {
    let chunk_radius = 8;
    let sand_per_chunk = 4;
    let drop_height: i64 = 10;
    let side = chunk_radius * 2;

    println!("=== Riverbed: Parallel Scheduler Benchmark ===\n");
    println!(
        "  {} chunks ({}x{} grid), {} sand drops and 1 water source per chunk\n",
        side * side,
        side,
        side,
        sand_per_chunk
    );

    let rules = riverbed_server::rules::standard(Arc::new(TableRegistry::standard()));
    let scheduler = Scheduler::new();

    // --- Sequential ---
    let world_seq = build_world(chunk_radius);
    let mut graph_seq = build_graph(chunk_radius, sand_per_chunk, drop_height);

    let t0 = Instant::now();
    let n_seq = scheduler.run_until_quiet(&world_seq, &mut graph_seq, &rules, 10_000);
    let dt_seq = t0.elapsed();

    println!("  Sequential: {:>8} events in {:>8.2?}", n_seq, dt_seq);

    // --- Parallel ---
    let world_par = build_world(chunk_radius);
    let mut graph_par = build_graph(chunk_radius, sand_per_chunk, drop_height);

    let t0 = Instant::now();
    let n_par = scheduler.run_until_quiet_parallel(&world_par, &mut graph_par, &rules, 10_000);
    let dt_par = t0.elapsed();

    println!("  Parallel:   {:>8} events in {:>8.2?}", n_par, dt_par);

    let speedup = dt_seq.as_secs_f64() / dt_par.as_secs_f64();
    println!("\n  Speedup: {:.2}x", speedup);

    let spawns_seq = event_bus::collect_outcome(&graph_seq).spawns.len();
    let spawns_par = event_bus::collect_outcome(&graph_par).spawns.len();
    println!("  Falling blocks: {} sequential, {} parallel", spawns_seq, spawns_par);

    // --- Verify identical ---
    let span = i64::from(chunk_radius) * 16;
    let mut mismatches = 0;
    for x in -span..span {
        for z in -span..span {
            for y in SURFACE..=drop_height {
                let pos = BlockPos::new(x, y, z);
                if world_seq.get_block(pos) != world_par.get_block(pos) {
                    mismatches += 1;
                }
            }
        }
    }

    if mismatches == 0 && spawns_seq == spawns_par {
        println!("  Verification: PASS (worlds identical)");
    } else {
        println!("  Verification: FAIL ({} mismatches!)", mismatches);
    }
}

fn build_world(chunk_radius: i32) -> World {
    let world = World::new();
    generate_flat_world(&world, chunk_radius, &LAYERS);
    world
}

fn build_graph(chunk_radius: i32, sand_per_chunk: i64, drop_height: i64) -> CausalGraph {
    let mut graph = CausalGraph::new();
    let place = |graph: &mut CausalGraph, pos: BlockPos, new: BlockId| {
        graph.insert_root(Event::new(EventPayload::BlockSet {
            pos,
            old: BlockId::AIR,
            new,
        }));
    };

    for cx in -chunk_radius..chunk_radius {
        for cz in -chunk_radius..chunk_radius {
            let (ox, oz) = (i64::from(cx) * 16, i64::from(cz) * 16);
            // Sand along one edge, water in the middle. A pool reaches 7
            // cells, so neighboring pools never touch.
            for i in 0..sand_per_chunk {
                place(
                    &mut graph,
                    BlockPos::new(ox + 1 + i * 4, drop_height, oz + 1),
                    block::SAND.default_block(),
                );
            }
            place(
                &mut graph,
                BlockPos::new(ox + 8, SURFACE, oz + 8),
                FluidState::SOURCE.block(block::WATER),
            );
        }
    }
    graph
}
