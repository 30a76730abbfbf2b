//! Material ids and the block-id packing used in chunk storage.
//!
//! A `BlockId` holds `material << 4 | state`: twelve bits of material and a
//! four-bit state payload. Only liquids use the payload today (see
//! [`crate::fluid::FluidState`]); every other material is stored with state 0.

use riverbed_engine::world::block::BlockId;

const STATE_BITS: u16 = 4;
const STATE_MASK: u16 = (1 << STATE_BITS) - 1;

/// Largest state payload a block id can carry.
pub const MAX_STATE: u8 = STATE_MASK as u8;

/// Block type, independent of its state payload. Also the key for registry
/// lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Material(pub u16);

pub const AIR: Material = Material(0);
pub const STONE: Material = Material(1);
pub const GRASS_BLOCK: Material = Material(2);
pub const DIRT: Material = Material(3);
pub const BEDROCK: Material = Material(4);
pub const SAND: Material = Material(5);
pub const RED_SAND: Material = Material(6);
pub const GRAVEL: Material = Material(7);
pub const WATER: Material = Material(8);
pub const LAVA: Material = Material(9);
pub const SHORT_GRASS: Material = Material(10);
pub const FERN: Material = Material(11);
pub const DEAD_BUSH: Material = Material(12);
pub const OAK_LOG: Material = Material(13);
pub const OAK_LEAVES: Material = Material(14);

/// Names accepted in configuration files.
const NAMES: &[(&str, Material)] = &[
    ("air", AIR),
    ("stone", STONE),
    ("grass_block", GRASS_BLOCK),
    ("dirt", DIRT),
    ("bedrock", BEDROCK),
    ("sand", SAND),
    ("red_sand", RED_SAND),
    ("gravel", GRAVEL),
    ("water", WATER),
    ("lava", LAVA),
    ("short_grass", SHORT_GRASS),
    ("fern", FERN),
    ("dead_bush", DEAD_BUSH),
    ("oak_log", OAK_LOG),
    ("oak_leaves", OAK_LEAVES),
];

impl Material {
    pub fn from_name(name: &str) -> Option<Material> {
        let name = name.strip_prefix("minecraft:").unwrap_or(name);
        NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, material)| *material)
    }

    pub fn name(self) -> Option<&'static str> {
        NAMES
            .iter()
            .find(|(_, material)| *material == self)
            .map(|(n, _)| *n)
    }

    /// This material in its default (zero) state.
    pub const fn default_block(self) -> BlockId {
        pack(self, 0)
    }
}

/// Combine a material and a state payload. The payload is truncated to
/// four bits.
pub const fn pack(material: Material, state: u8) -> BlockId {
    BlockId((material.0 << STATE_BITS) | (state as u16 & STATE_MASK))
}

pub const fn material(id: BlockId) -> Material {
    Material(id.0 >> STATE_BITS)
}

pub const fn state(id: BlockId) -> u8 {
    (id.0 & STATE_MASK) as u8
}

/// Do two blocks share a material, whatever their state?
pub const fn same_material(a: BlockId, b: BlockId) -> bool {
    material(a).0 == material(b).0
}
