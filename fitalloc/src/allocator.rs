use tracing::{debug, trace, warn};

use crate::chunk::{Chunk, ChunkStatus};
use crate::chunk_list::{ChunkList, Position};
use crate::error::AllocError;
use crate::fit::{FitSearch, Strategy};

/// Result of a successful [`Allocator::free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    /// Address that was freed.
    pub address: usize,
    /// Size of the occupied chunk that was freed.
    pub size: usize,
    pub merged_prev: bool,
    pub merged_next: bool,
    /// Free chunk left behind after coalescing.
    pub region: Chunk,
}

/// Split-on-allocate, merge-on-free allocator over a borrowed [`ChunkList`].
///
/// The allocator owns nothing but its placement policy; every call resolves
/// chunks by scanning the list it is given, so no position survives a call.
pub struct Allocator {
    search: Box<dyn FitSearch>,
}

impl Allocator {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            search: strategy.search(),
        }
    }

    pub fn with_search(search: impl FitSearch + 'static) -> Self {
        Self {
            search: Box::new(search),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.search.name()
    }

    /// Carves `size` units out of the free chunk chosen by the placement
    /// policy and returns the address of the new occupied chunk.
    pub fn allocate(&self, list: &mut ChunkList, size: usize) -> Result<usize, AllocError> {
        if size == 0 {
            return Err(AllocError::ZeroSize);
        }

        let Some(position) = self.search.find(list, size) else {
            let largest_free = list.largest_free();
            debug!(
                requested = size,
                largest_free,
                total_free = list.total_free(),
                "no free chunk large enough"
            );
            return Err(AllocError::OutOfMemory {
                requested: size,
                largest_free,
            });
        };

        let found = *chunk(list, position)?;
        if found.size == size {
            chunk_mut(list, position)?.status = ChunkStatus::Occupied;
            trace!(address = found.address, size, "exact fit");
            return Ok(found.address);
        }

        // The occupied head takes the found chunk's address; the free
        // remainder starts right where the head ends.
        list.insert_before(position, Chunk::occupied(found.address, size))?;
        let remainder = chunk_mut(list, position)?;
        remainder.address += size;
        remainder.size -= size;
        trace!(
            address = found.address,
            size,
            remainder = remainder.size,
            "split free chunk"
        );

        Ok(found.address)
    }

    /// Frees the occupied chunk starting at `address` and coalesces it with
    /// free neighbours.
    ///
    /// An address that does not start an occupied chunk is ignored and
    /// yields `Ok(None)`.
    pub fn free(&self, list: &mut ChunkList, address: usize) -> Result<Option<Release>, AllocError> {
        let Some(position) = list.find_by_address(address) else {
            warn!(address, "free of unknown address ignored");
            return Ok(None);
        };

        let freed = chunk_mut(list, position)?;
        if freed.is_free() {
            warn!(address, "free of already free chunk ignored");
            return Ok(None);
        }
        freed.status = ChunkStatus::Free;
        let size = freed.size;

        let merged_prev = match free_neighbour(list, list.prev(position)) {
            Some(prev) => {
                let absorbed = list.remove(prev)?;
                let current = chunk_mut(list, position)?;
                current.address = absorbed.address;
                current.size += absorbed.size;
                true
            }
            None => false,
        };

        let merged_next = match free_neighbour(list, list.next(position)) {
            Some(next) => {
                let absorbed = list.remove(next)?;
                chunk_mut(list, position)?.size += absorbed.size;
                true
            }
            None => false,
        };

        let region = *chunk(list, position)?;
        trace!(
            address,
            size,
            merged_prev,
            merged_next,
            region_address = region.address,
            region_size = region.size,
            "released chunk"
        );

        Ok(Some(Release {
            address,
            size,
            merged_prev,
            merged_next,
            region,
        }))
    }
}

fn free_neighbour(list: &ChunkList, neighbour: Option<Position>) -> Option<Position> {
    neighbour.filter(|&position| list.get(position).is_some_and(Chunk::is_free))
}

fn chunk(list: &ChunkList, position: Position) -> Result<&Chunk, AllocError> {
    list.get(position)
        .ok_or(AllocError::Storage(collections::Error::NotFound))
}

fn chunk_mut(list: &mut ChunkList, position: Position) -> Result<&mut Chunk, AllocError> {
    list.get_mut(position)
        .ok_or(AllocError::Storage(collections::Error::NotFound))
}
