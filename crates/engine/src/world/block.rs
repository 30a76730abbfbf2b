/// Opaque block-state handle as stored in chunks.
///
/// The engine never decodes these. Game layers pack whatever they need into
/// the 16 bits (the server crate uses a material id plus a 4-bit state
/// payload) and hand the engine only values.
///
/// `BlockId::AIR` (0) is the one value with engine meaning: empty space.
/// Sections that contain nothing else are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}
