use crate::access::{BlockUpdate, Cascade, WorldAccess};
use crate::causal::event::{Event, EventPayload};
use crate::world::World;

/// A block-update rule: given one update, decide what changes and what must
/// be re-evaluated next.
///
/// Rules must be **local**: they only touch a bounded neighborhood of the
/// update's position, and they never loop to finish a propagation. Further
/// work goes through [`WorldAccess::schedule_update`]. This locality is what
/// lets unrelated updates run in any order or in parallel.
pub trait Rule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate `update`. Returns whether the rule considers the update
    /// handled; a rule may still have written or scheduled when it returns
    /// `false`.
    fn evaluate(&self, world: &mut dyn WorldAccess, update: &BlockUpdate) -> bool;
}

/// An ordered collection of rules. When an event is executed, every rule
/// is consulted; their effects become children of the triggering event.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against the update raised by `payload` and collect the
    /// resulting events.
    ///
    /// `BlockSet` raises an update carrying the written block, followed by a
    /// notification of each of the six neighbors. `BlockNotify` raises an
    /// update whose block is read now (absent outside the loaded area). Silent
    /// writes and spawn requests raise nothing.
    pub fn evaluate(&self, world: &World, payload: &EventPayload) -> Vec<Event> {
        let update = match payload {
            EventPayload::BlockSet { pos, new, .. } => BlockUpdate::with_block(*pos, *new),
            EventPayload::BlockNotify { pos } => BlockUpdate {
                pos: *pos,
                block: world.try_get_block(*pos),
            },
            EventPayload::BlockSetUntracked { .. } | EventPayload::SpawnFallingBlock { .. } => {
                return Vec::new();
            }
        };

        let mut cascade = Cascade::new(world);
        for rule in &self.rules {
            if rule.evaluate(&mut cascade, &update) {
                tracing::trace!(rule = rule.name(), pos = ?update.pos, "update handled");
            }
        }

        let mut out = cascade.into_events();
        if let EventPayload::BlockSet { pos, .. } = payload {
            out.extend(
                pos.neighbors()
                    .into_iter()
                    .map(|pos| Event::new(EventPayload::BlockNotify { pos })),
            );
        }
        out
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}
