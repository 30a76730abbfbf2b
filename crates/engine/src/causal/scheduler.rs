use super::event::{Event, EventId, EventPayload};
use super::graph::CausalGraph;
use crate::rules::RuleSet;
use crate::world::World;
use crate::world::position::ChunkPos;
use rayon::prelude::*;
use std::collections::HashMap;

/// Drains the causal frontier: applies each event to the world, then asks
/// the rule set what follows from it.
///
/// Every rule evaluation does bounded work and hands its follow-ups back as
/// new graph nodes, so a flood spreads one wave per step rather than by
/// recursion. `step` runs one wave sequentially; `step_parallel` runs it on
/// the rayon pool.
pub struct Scheduler {
    pub max_events_per_step: usize,
}

/// One wave's worth of work: frontier events with their ids, capped.
type Wave = Vec<(EventId, Event)>;

impl Scheduler {
    pub fn new() -> Self {
        Self::with_max_events_per_step(10_000)
    }

    pub fn with_max_events_per_step(max_events_per_step: usize) -> Self {
        Self {
            max_events_per_step,
        }
    }

    /// Run one wave in frontier order. Each event sees the writes of the
    /// events before it in the same wave.
    pub fn step(&self, world: &World, graph: &mut CausalGraph, rules: &RuleSet) -> usize {
        let wave = self.next_wave(graph);
        let executed = wave.len();
        for (id, event) in wave {
            let consequents = execute(world, rules, &event.payload);
            commit(graph, id, consequents);
        }
        executed
    }

    /// Run one wave on the rayon pool. Events on the same chunk stay on one
    /// thread, in frontier order; different chunks run concurrently and may
    /// observe each other's writes mid-wave.
    pub fn step_parallel(&self, world: &World, graph: &mut CausalGraph, rules: &RuleSet) -> usize {
        let wave = self.next_wave(graph);
        if wave.is_empty() {
            return 0;
        }

        let results: Vec<Vec<(EventId, Vec<Event>)>> = group_by_chunk(wave)
            .into_par_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|(id, event)| (id, execute(world, rules, &event.payload)))
                    .collect()
            })
            .collect();

        let mut executed = 0;
        for (id, consequents) in results.into_iter().flatten() {
            commit(graph, id, consequents);
            executed += 1;
        }
        executed
    }

    pub fn run_until_quiet(
        &self,
        world: &World,
        graph: &mut CausalGraph,
        rules: &RuleSet,
        max_steps: usize,
    ) -> usize {
        self.drain(graph, max_steps, "sequential", |graph| {
            self.step(world, graph, rules)
        })
    }

    pub fn run_until_quiet_parallel(
        &self,
        world: &World,
        graph: &mut CausalGraph,
        rules: &RuleSet,
        max_steps: usize,
    ) -> usize {
        self.drain(graph, max_steps, "parallel", |graph| {
            self.step_parallel(world, graph, rules)
        })
    }

    /// Repeat `step` until a wave executes nothing or `max_steps` is spent.
    fn drain<F>(&self, graph: &mut CausalGraph, max_steps: usize, mode: &str, mut step: F) -> usize
    where
        F: FnMut(&mut CausalGraph) -> usize,
    {
        let mut total = 0;
        for _ in 0..max_steps {
            let n = step(graph);
            if n == 0 {
                return total;
            }
            total += n;
        }
        if !graph.frontier().is_empty() {
            tracing::warn!(
                "{} cascade still active after {} steps ({} events executed)",
                mode,
                max_steps,
                total
            );
        }
        total
    }

    fn next_wave(&self, graph: &CausalGraph) -> Wave {
        graph
            .frontier()
            .into_iter()
            .filter_map(|id| graph.get(id).map(|node| (id, node.event.clone())))
            .take(self.max_events_per_step)
            .collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Commit an event's block effect, if it has one.
pub fn apply_event(world: &World, payload: &EventPayload) {
    match payload {
        EventPayload::BlockSet { pos, new, .. }
        | EventPayload::BlockSetUntracked { pos, new, .. } => {
            world.set_block(*pos, *new);
        }
        EventPayload::BlockNotify { .. } | EventPayload::SpawnFallingBlock { .. } => {}
    }
}

fn execute(world: &World, rules: &RuleSet, payload: &EventPayload) -> Vec<Event> {
    apply_event(world, payload);
    rules.evaluate(world, payload)
}

fn commit(graph: &mut CausalGraph, id: EventId, consequents: Vec<Event>) {
    graph.mark_executed(id);
    for event in consequents {
        graph.insert(event, vec![id]);
    }
}

/// Split a wave by chunk, keeping frontier order inside each group and
/// ordering groups by their first event.
fn group_by_chunk(wave: Wave) -> Vec<Wave> {
    let mut index: HashMap<ChunkPos, usize> = HashMap::new();
    let mut groups: Vec<Wave> = Vec::new();
    for (id, event) in wave {
        let slot = *index.entry(event.chunk()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push((id, event));
    }
    groups
}
