//! Static block classification tables, injected into the rules.
//!
//! Rules never consult global state: they hold a [`BlockRegistry`] and ask it
//! which materials are liquids, which a liquid may wash away, and which fall.
//! Tests build small fixture registries the same way the server builds its
//! configured one.

use std::collections::HashSet;
use std::sync::Arc;

use riverbed_engine::world::block::BlockId;

use crate::block::{self, Material};

pub trait BlockRegistry: Send + Sync {
    fn is_liquid(&self, material: Material) -> bool;

    /// May a liquid overwrite this material in place?
    fn is_replaceable_by_fluid(&self, material: Material) -> bool;

    /// Does this material drop when unsupported?
    fn has_gravity(&self, material: Material) -> bool;

    /// The block id for `material` in `state`. Materials without a state
    /// payload ignore `state`.
    fn block_for(&self, material: Material, state: u8) -> BlockId {
        if self.is_liquid(material) {
            block::pack(material, state)
        } else {
            material.default_block()
        }
    }
}

impl<R: BlockRegistry + ?Sized> BlockRegistry for Arc<R> {
    fn is_liquid(&self, material: Material) -> bool {
        (**self).is_liquid(material)
    }

    fn is_replaceable_by_fluid(&self, material: Material) -> bool {
        (**self).is_replaceable_by_fluid(material)
    }

    fn has_gravity(&self, material: Material) -> bool {
        (**self).has_gravity(material)
    }

    fn block_for(&self, material: Material, state: u8) -> BlockId {
        (**self).block_for(material, state)
    }
}

const LIQUIDS: &[Material] = &[block::WATER, block::LAVA];

const FLUID_REPLACEABLE: &[Material] = &[
    block::AIR,
    block::SHORT_GRASS,
    block::FERN,
    block::DEAD_BUSH,
];

const GRAVITY: &[Material] = &[block::SAND, block::RED_SAND, block::GRAVEL];

/// Set-backed registry.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    liquids: HashSet<Material>,
    fluid_replaceable: HashSet<Material>,
    gravity: HashSet<Material>,
}

impl TableRegistry {
    /// The built-in tables.
    pub fn standard() -> Self {
        Self::new(LIQUIDS, FLUID_REPLACEABLE, GRAVITY)
    }

    /// Build from explicit tables. A material listed as a liquid is never
    /// treated as fluid-replaceable.
    pub fn new(
        liquids: &[Material],
        fluid_replaceable: &[Material],
        gravity: &[Material],
    ) -> Self {
        let liquids: HashSet<Material> = liquids.iter().copied().collect();
        let fluid_replaceable = fluid_replaceable
            .iter()
            .copied()
            .filter(|m| !liquids.contains(m))
            .collect();
        Self {
            liquids,
            fluid_replaceable,
            gravity: gravity.iter().copied().collect(),
        }
    }
}

impl BlockRegistry for TableRegistry {
    fn is_liquid(&self, material: Material) -> bool {
        self.liquids.contains(&material)
    }

    fn is_replaceable_by_fluid(&self, material: Material) -> bool {
        self.fluid_replaceable.contains(&material)
    }

    fn has_gravity(&self, material: Material) -> bool {
        self.gravity.contains(&material)
    }
}
