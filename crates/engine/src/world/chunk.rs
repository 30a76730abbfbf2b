use super::block::BlockId;
use super::position::LocalBlockPos;
use std::collections::HashMap;

/// Number of blocks along each axis of a chunk section.
pub const SECTION_SIZE: usize = 16;
const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// A 16x16x16 cube of blocks, YZX-ordered so a horizontal layer is one
/// contiguous run.
///
/// Keeps a count of non-air cells so emptiness is known without a scan.
#[derive(Clone)]
pub struct ChunkSection {
    blocks: Box<[BlockId; SECTION_VOLUME]>,
    non_air: u16,
}

impl ChunkSection {
    pub fn new_filled(block: BlockId) -> Self {
        Self {
            blocks: Box::new([block; SECTION_VOLUME]),
            non_air: if block.is_air() { 0 } else { SECTION_VOLUME as u16 },
        }
    }

    pub fn new_empty() -> Self {
        Self::new_filled(BlockId::AIR)
    }

    #[inline]
    const fn index(x: u8, y: u8, z: u8) -> usize {
        (y as usize) * SECTION_SIZE * SECTION_SIZE + (z as usize) * SECTION_SIZE + (x as usize)
    }

    #[inline]
    pub fn get(&self, x: u8, y: u8, z: u8) -> BlockId {
        self.blocks[Self::index(x, y, z)]
    }

    /// Store `block`, returning the previous occupant.
    pub fn set(&mut self, x: u8, y: u8, z: u8, block: BlockId) -> BlockId {
        let slot = &mut self.blocks[Self::index(x, y, z)];
        let old = std::mem::replace(slot, block);
        match (old.is_air(), block.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        old
    }

    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }
}

/// A column of chunk sections keyed by section index (`y >> 4`).
///
/// Only sections holding at least one non-air block are kept. A chunk that
/// exists is "loaded"; its missing sections still read as air.
#[derive(Default)]
pub struct Chunk {
    sections: HashMap<i32, ChunkSection>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_block(&self, pos: LocalBlockPos) -> BlockId {
        self.sections
            .get(&pos.section_index())
            .map_or(BlockId::AIR, |section| {
                section.get(pos.x, pos.section_local_y(), pos.z)
            })
    }

    /// Store `block`, returning the previous occupant.
    pub fn set_block(&mut self, pos: LocalBlockPos, block: BlockId) -> BlockId {
        let section_idx = pos.section_index();
        let y = pos.section_local_y();

        if block.is_air() {
            let Some(section) = self.sections.get_mut(&section_idx) else {
                return BlockId::AIR;
            };
            let old = section.set(pos.x, y, pos.z, block);
            if section.is_empty() {
                self.sections.remove(&section_idx);
            }
            old
        } else {
            self.sections
                .entry(section_idx)
                .or_insert_with(ChunkSection::new_empty)
                .set(pos.x, y, pos.z, block)
        }
    }

    /// Fill one full 16x16 horizontal layer at height `y`.
    pub fn fill_layer(&mut self, y: i64, block: BlockId) {
        for x in 0..SECTION_SIZE as u8 {
            for z in 0..SECTION_SIZE as u8 {
                self.set_block(LocalBlockPos { x, y, z }, block);
            }
        }
    }
}
