/// Absolute block position in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BlockPos {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(&self, dx: i64, dy: i64, dz: i64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub const fn up(&self) -> Self {
        self.offset(0, 1, 0)
    }

    pub const fn down(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// +Z
    pub const fn forward(&self) -> Self {
        self.offset(0, 0, 1)
    }

    /// -Z
    pub const fn backward(&self) -> Self {
        self.offset(0, 0, -1)
    }

    /// -X
    pub const fn left(&self) -> Self {
        self.offset(-1, 0, 0)
    }

    /// +X
    pub const fn right(&self) -> Self {
        self.offset(1, 0, 0)
    }

    /// The chunk this block belongs to.
    pub const fn chunk(&self) -> ChunkPos {
        ChunkPos {
            x: (self.x >> 4) as i32,
            z: (self.z >> 4) as i32,
        }
    }

    /// Position within the chunk (0..16 on x and z, y unchanged).
    pub const fn local(&self) -> LocalBlockPos {
        LocalBlockPos {
            x: (self.x & 0xF) as u8,
            y: self.y,
            z: (self.z & 0xF) as u8,
        }
    }

    /// The four horizontal neighbors in probe order: forward, backward,
    /// left, right. Rules that pick "the first" neighbor rely on this order.
    pub const fn horizontal_neighbors(&self) -> [BlockPos; 4] {
        [self.forward(), self.backward(), self.left(), self.right()]
    }

    /// The six cardinal neighbors.
    pub const fn neighbors(&self) -> [BlockPos; 6] {
        [
            self.up(),
            self.down(),
            self.forward(),
            self.backward(),
            self.left(),
            self.right(),
        ]
    }
}

/// Chunk column position (each chunk is 16x16 blocks horizontally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Block position local to a chunk (x, z in 0..16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalBlockPos {
    pub x: u8,
    pub y: i64,
    pub z: u8,
}

impl LocalBlockPos {
    pub const fn section_index(&self) -> i32 {
        (self.y >> 4) as i32
    }

    pub const fn section_local_y(&self) -> u8 {
        (self.y.rem_euclid(16)) as u8
    }
}
