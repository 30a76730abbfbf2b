pub mod falling_block;
pub mod fluid_flow;
pub mod helpers;

use riverbed_engine::rules::RuleSet;

use crate::registry::BlockRegistry;
use falling_block::FallingBlocks;
use fluid_flow::FluidFlow;

/// The standard rule set: falling blocks, then fluid flow.
pub fn standard<R>(registry: R) -> RuleSet
where
    R: BlockRegistry + Clone + 'static,
{
    let mut rules = RuleSet::new();
    rules.add(FallingBlocks::new(registry.clone()));
    rules.add(FluidFlow::new(registry));
    rules
}
