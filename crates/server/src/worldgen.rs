//! Flat test worlds.

use riverbed_engine::world::World;
use riverbed_engine::world::chunk::Chunk;
use riverbed_engine::world::position::ChunkPos;

use crate::block::Material;

/// Fill chunks `-radius..radius` on both axes with one full layer per
/// material, starting at y=0. The top surface is at `y = layers.len() - 1`.
pub fn generate_flat_world(world: &World, chunk_radius: i32, layers: &[Material]) {
    for cx in -chunk_radius..chunk_radius {
        for cz in -chunk_radius..chunk_radius {
            let mut chunk = Chunk::new();
            for (y, material) in layers.iter().enumerate() {
                chunk.fill_layer(y as i64, material.default_block());
            }
            world.insert_chunk(ChunkPos::new(cx, cz), chunk);
        }
    }
}
