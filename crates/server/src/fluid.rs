//! Liquid state payload: flow level and the falling flag.
//!
//! Stored as one 4-bit value `v`: `level = v & 7`, `falling = v >= 8`.
//! Level 0 is a source; 1..=7 is flowing water weakening away from it.

use riverbed_engine::world::block::BlockId;

use crate::block::{self, Material};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FluidState(u8);

impl FluidState {
    /// Non-falling level 0.
    pub const SOURCE: FluidState = FluidState(0);
    /// Weakest level that still exists; it does not spread sideways.
    pub const MAX_LEVEL: u8 = 7;
    const FALLING: u8 = 8;

    /// Decode a stored payload. Bits above the fourth are ignored.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & 0x0F)
    }

    /// A horizontally flowing state, or `None` past [`Self::MAX_LEVEL`].
    pub const fn flowing(level: u8) -> Option<Self> {
        if level > Self::MAX_LEVEL {
            None
        } else {
            Some(Self(level))
        }
    }

    /// A falling state carrying `level`, or `None` past [`Self::MAX_LEVEL`].
    pub const fn falling(level: u8) -> Option<Self> {
        if level > Self::MAX_LEVEL {
            None
        } else {
            Some(Self(level + Self::FALLING))
        }
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn level(self) -> u8 {
        self.0 & Self::MAX_LEVEL
    }

    pub const fn is_falling(self) -> bool {
        self.0 >= Self::FALLING
    }

    pub const fn is_source(self) -> bool {
        self.0 == 0
    }

    /// The state one horizontal step further from the source.
    pub const fn weakened(self) -> Option<Self> {
        Self::flowing(self.level() + 1)
    }

    /// Read the state payload of a block.
    pub const fn of(block: BlockId) -> Self {
        Self::from_raw(block::state(block))
    }

    /// `material` carrying this state.
    pub const fn block(self, material: Material) -> BlockId {
        block::pack(material, self.0)
    }
}
