use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use riverbed_engine::causal::event::{Event, EventPayload};
use riverbed_engine::world::World;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;
use riverbed_server::block;
use riverbed_server::config::{Config, SchedulerConfig};
use riverbed_server::event_bus::{self, WorldChangeBatch};
use riverbed_server::fluid::FluidState;
use riverbed_server::metrics::Metrics;
use riverbed_server::registry::{BlockRegistry, TableRegistry};
use riverbed_server::simulation::{self, Runtime, ScriptedEdits, SimulationLayer};
use riverbed_server::worldgen::generate_flat_world;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "riverbed-server", about = "Reactive block physics on the causal voxel engine")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation layers against a flat world until Ctrl+C.
    Run {
        #[arg(short, long, default_value = "riverbed.toml")]
        config: PathBuf,
    },
    /// Drop sand and pour water on a small world, then report the result.
    Demo {
        /// Use the parallel scheduler.
        #[arg(long)]
        parallel: bool,
        /// Print the causal graph as Graphviz DOT on stdout.
        #[arg(long)]
        dot: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Run { config } => run(&config).await,
        Command::Demo { parallel, dot } => {
            run_demo(parallel, dot);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).with_context(|| format!("loading {}", path.display()))
}

async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = Arc::new(config.registry().context("building block registry")?);
    let layers = config.layers().context("reading world layers")?;
    let edits = config.edits(&registry).context("reading scripted edits")?;

    tracing::info!("Riverbed -- reactive block physics");

    let world = Arc::new(World::new());
    tracing::info!("Generating flat world...");
    generate_flat_world(&world, config.world.chunk_radius, &layers);
    tracing::info!("World ready: {} chunks", world.chunk_count());

    let (bus_tx, _) = broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);
    let metrics = Arc::new(Metrics::new());

    // Bus logger.
    let mut bus_rx = bus_tx.subscribe();
    tokio::spawn(async move {
        loop {
            match bus_rx.recv().await {
                Ok(batch) => tracing::info!(
                    "[{}] {} block changes, {} falling blocks",
                    batch.source,
                    batch.changes.len(),
                    batch.spawns.len()
                ),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Bus logger lagged, {} batches skipped", n)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    if config.simulation.stats_interval_secs > 0 {
        let stats_metrics = Arc::clone(&metrics);
        let stats_world = Arc::clone(&world);
        let every = Duration::from_secs(config.simulation.stats_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // first tick is immediate, skip it
            loop {
                interval.tick().await;
                let snapshot = stats_metrics.snapshot(stats_world.chunk_count() as u64);
                match serde_json::to_string(&snapshot) {
                    Ok(json) => tracing::info!("stats {}", json),
                    Err(e) => tracing::error!("Failed to encode stats: {}", e),
                }
            }
        });
    }

    tracing::info!("{} scripted edits loaded", edits.len());
    let sim_layers: Vec<Box<dyn SimulationLayer>> = vec![Box::new(ScriptedEdits::new(
        edits,
        Duration::from_millis(config.simulation.tick_ms),
    ))];
    let runtime = Runtime {
        world: Arc::clone(&world),
        rules: Arc::new(riverbed_server::rules::standard(Arc::clone(&registry))),
        metrics: Arc::clone(&metrics),
        bus: bus_tx,
        scheduler: config.scheduler.clone(),
    };
    simulation::start(runtime, sim_layers);

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl+C")?;
    tracing::info!("Ctrl+C received, shutting down...");

    let snapshot = metrics.snapshot(world.chunk_count() as u64);
    tracing::info!(
        "Final: {} cascades, {} events, {} block writes, {} falling blocks",
        snapshot.cascades_total,
        snapshot.events_total,
        snapshot.block_writes,
        snapshot.falling_spawns
    );
    Ok(())
}

/// Sand dropped from the sky plus a water source poured on the ground,
/// run to quiescence in one cascade.
fn run_demo(parallel: bool, dot: bool) {
    tracing::info!("Riverbed -- causal engine demo");

    let registry = Arc::new(TableRegistry::standard());
    let world = World::new();
    let layers = [block::BEDROCK, block::STONE, block::STONE, block::STONE, block::DIRT];
    generate_flat_world(&world, 4, &layers);
    tracing::info!("World ready: {} chunks loaded", world.chunk_count());

    let sand_pos = BlockPos::new(8, 10, 8);
    let spring_pos = BlockPos::new(-8, 5, -8);
    let water = FluidState::SOURCE.block(block::WATER);
    let roots = vec![
        Event::new(EventPayload::BlockSet {
            pos: sand_pos,
            old: BlockId::AIR,
            new: block::SAND.default_block(),
        }),
        Event::new(EventPayload::BlockSet {
            pos: spring_pos,
            old: BlockId::AIR,
            new: water,
        }),
    ];
    tracing::info!("Injected sand at {:?} and water at {:?}", sand_pos, spring_pos);

    let rules = riverbed_server::rules::standard(Arc::clone(&registry));
    let settings = SchedulerConfig {
        parallel,
        ..SchedulerConfig::default()
    };
    let started = Instant::now();
    let (graph, total) = simulation::run_cascade(&world, &rules, &settings, roots);
    tracing::info!(
        "Quiescence after {} events ({} in graph) in {:?}{}",
        total,
        graph.len(),
        started.elapsed(),
        if parallel { ", parallel" } else { "" }
    );

    let outcome = event_bus::collect_outcome(&graph);
    for (pos, spawned) in &outcome.spawns {
        tracing::info!("Falling block {:?} spawned at {:?}", spawned, pos);
    }

    let mut wet = 0;
    for x in spring_pos.x - 8..=spring_pos.x + 8 {
        for z in spring_pos.z - 8..=spring_pos.z + 8 {
            let occupant = world.get_block(BlockPos::new(x, spring_pos.y, z));
            if registry.is_liquid(block::material(occupant)) {
                wet += 1;
            }
        }
    }
    tracing::info!("Water covers {} cells around the spring", wet);

    if world.get_block(sand_pos).is_air() && outcome.spawns.len() == 1 {
        tracing::info!("Sand left the grid as a falling block.");
    } else {
        tracing::warn!("Unexpected sand outcome -- something is off.");
    }

    if dot {
        print!("{}", graph.to_dot());
    }
}
