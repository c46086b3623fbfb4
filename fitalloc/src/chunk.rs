use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Free,
    Occupied,
}

/// One address-contiguous region of the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub status: ChunkStatus,
    pub address: usize,
    pub size: usize,
}

impl Chunk {
    pub fn free(address: usize, size: usize) -> Self {
        Self {
            status: ChunkStatus::Free,
            address,
            size,
        }
    }

    pub fn occupied(address: usize, size: usize) -> Self {
        Self {
            status: ChunkStatus::Occupied,
            address,
            size,
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.status == ChunkStatus::Free
    }

    /// First address past this chunk.
    #[inline]
    pub fn end(&self) -> usize {
        self.address + self.size
    }
}
