//! Simulation layers: the tick-driven side of the dispatcher.
//!
//! Each [`SimulationLayer`] runs on its own tokio task and periodically
//! raises root events. Those events are run to quiescence through a fresh
//! [`CausalGraph`] and the outcome is published to the event bus. A cascade
//! cut off by the step cap resumes on the layer's next tick.
//!
//! # Adding a new layer
//!
//! 1. Implement [`SimulationLayer`] for your struct.
//! 2. Push a `Box::new(YourLayer)` into the `layers` vec in `main.rs`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use riverbed_engine::causal::event::{Event, EventPayload};
use riverbed_engine::causal::graph::CausalGraph;
use riverbed_engine::causal::scheduler::Scheduler;
use riverbed_engine::rules::RuleSet;
use riverbed_engine::world::World;
use riverbed_engine::world::block::BlockId;
use riverbed_engine::world::position::BlockPos;
use tokio::sync::broadcast;

use crate::config::SchedulerConfig;
use crate::event_bus::{self, CascadeOutcome, WorldChangeBatch};
use crate::metrics::Metrics;

/// A pluggable layer that raises root events on a timer.
///
/// Layers should be cheap per tick; heavy work belongs in the cascade.
pub trait SimulationLayer: Send + Sync + 'static {
    /// Used for logging and as the batch source on the bus.
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    /// Inspect the world and return root events to inject, if any.
    fn generate_events(&self, world: &World) -> Vec<Event>;
}

/// Shared state every layer task needs.
#[derive(Clone)]
pub struct Runtime {
    pub world: Arc<World>,
    pub rules: Arc<RuleSet>,
    pub metrics: Arc<Metrics>,
    pub bus: broadcast::Sender<WorldChangeBatch>,
    pub scheduler: SchedulerConfig,
}

/// Run `roots` to quiescence on a fresh graph and return the graph with the
/// number of events executed.
pub fn run_cascade(
    world: &World,
    rules: &RuleSet,
    settings: &SchedulerConfig,
    roots: Vec<Event>,
) -> (CausalGraph, usize) {
    let mut graph = CausalGraph::new();
    for event in roots {
        graph.insert_root(event);
    }
    let scheduler = Scheduler::with_max_events_per_step(settings.max_events_per_step);
    let executed = if settings.parallel {
        scheduler.run_until_quiet_parallel(world, &mut graph, rules, settings.max_steps)
    } else {
        scheduler.run_until_quiet(world, &mut graph, rules, settings.max_steps)
    };
    (graph, executed)
}

/// Updates a capped cascade left unexecuted, carried into the next one.
///
/// Each layer task owns one. Carried events rejoin as roots ahead of the
/// tick's new edits, so no scheduled update is dropped when a cascade hits
/// `max_steps`.
#[derive(Debug, Default)]
pub struct Backlog {
    pending: Vec<Event>,
}

impl Backlog {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run the carried updates plus `roots`, then keep whatever the cascade
    /// did not reach.
    pub fn run(
        &mut self,
        world: &World,
        rules: &RuleSet,
        settings: &SchedulerConfig,
        roots: Vec<Event>,
    ) -> (CausalGraph, usize) {
        let mut events = std::mem::take(&mut self.pending);
        events.extend(roots);
        let (graph, executed) = run_cascade(world, rules, settings, events);
        self.pending = graph.pending().cloned().collect();
        if !self.pending.is_empty() {
            tracing::debug!(
                "cascade cut off after {} steps, carrying {} updates",
                settings.max_steps,
                self.pending.len()
            );
        }
        (graph, executed)
    }
}

/// Spawn one tokio task per layer.
pub fn start(runtime: Runtime, layers: Vec<Box<dyn SimulationLayer>>) {
    for layer in layers {
        let runtime = runtime.clone();
        tokio::spawn(async move {
            let name = layer.name();
            let mut interval = tokio::time::interval(layer.interval());
            // The first tick fires immediately; skip it so the world has time to initialize.
            interval.tick().await;

            tracing::info!("Simulation layer '{}' started (interval {:?})", name, layer.interval());

            let mut backlog = Backlog::default();
            loop {
                interval.tick().await;

                let events = layer.generate_events(&runtime.world);
                if events.is_empty() && backlog.is_empty() {
                    continue;
                }

                let started = Instant::now();
                let (graph, executed) =
                    backlog.run(&runtime.world, &runtime.rules, &runtime.scheduler, events);
                let outcome: CascadeOutcome = event_bus::collect_outcome(&graph);
                runtime
                    .metrics
                    .record_cascade(executed as u64, started.elapsed(), &outcome);

                if !outcome.is_empty() {
                    tracing::debug!(
                        "Simulation '{}': {} events executed, {} block changes, {} falling blocks",
                        name,
                        executed,
                        outcome.changes.len(),
                        outcome.spawns.len()
                    );
                    // No subscribers is fine.
                    let _ = runtime.bus.send(outcome.into_batch(name));
                }
            }
        });
    }
}

/// A block edit replayed by [`ScriptedEdits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedEdit {
    pub tick: u64,
    pub pos: BlockPos,
    pub block: BlockId,
}

/// Replays a fixed list of world edits, each on its tick. Stands in for the
/// world-edit pipeline that raises the first update of a cascade.
pub struct ScriptedEdits {
    edits: Vec<ScriptedEdit>,
    interval: Duration,
    tick: AtomicU64,
}

impl ScriptedEdits {
    pub fn new(mut edits: Vec<ScriptedEdit>, interval: Duration) -> Self {
        edits.sort_by_key(|edit| edit.tick);
        Self {
            edits,
            interval,
            tick: AtomicU64::new(0),
        }
    }

    pub fn is_finished(&self) -> bool {
        let last = self.edits.last().map_or(0, |edit| edit.tick);
        self.tick.load(Ordering::Relaxed) > last
    }
}

impl SimulationLayer for ScriptedEdits {
    fn name(&self) -> &'static str {
        "scripted_edits"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn generate_events(&self, world: &World) -> Vec<Event> {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        self.edits
            .iter()
            .filter(|edit| edit.tick == tick)
            .map(|edit| {
                Event::new(EventPayload::BlockSet {
                    pos: edit.pos,
                    old: world.get_block(edit.pos),
                    new: edit.block,
                })
            })
            .collect()
    }
}
