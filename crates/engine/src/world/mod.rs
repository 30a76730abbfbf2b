pub mod block;
pub mod chunk;
pub mod position;

use block::BlockId;
use chunk::Chunk;
use dashmap::DashMap;
use position::{BlockPos, ChunkPos};

/// The block grid shared by every rule evaluation. Lock-sharded by chunk.
///
/// Writes to one position are serialized by the shard lock; nothing here
/// holds a lock across several positions. Rules read a neighborhood and then
/// write, and a concurrent writer may land in between.
pub struct World {
    chunks: DashMap<ChunkPos, Chunk>,
}

impl World {
    pub fn new() -> Self {
        Self {
            chunks: DashMap::new(),
        }
    }

    /// Read a block. Unloaded chunks read as AIR.
    pub fn get_block(&self, pos: BlockPos) -> BlockId {
        self.try_get_block(pos).unwrap_or(BlockId::AIR)
    }

    /// Read a block, or `None` if its chunk is not loaded.
    pub fn try_get_block(&self, pos: BlockPos) -> Option<BlockId> {
        self.chunks
            .get(&pos.chunk())
            .map(|chunk| chunk.get_block(pos.local()))
    }

    /// Write a block, creating its chunk if needed. Returns the previous
    /// occupant.
    ///
    /// Takes `&self`: `DashMap` locks the owning shard for the duration.
    pub fn set_block(&self, pos: BlockPos, block: BlockId) -> BlockId {
        self.chunks
            .entry(pos.chunk())
            .or_default()
            .set_block(pos.local(), block)
    }

    pub fn has_chunk(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Insert a pre-built chunk (world generation).
    pub fn insert_chunk(&self, pos: ChunkPos, chunk: Chunk) {
        self.chunks.insert(pos, chunk);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
