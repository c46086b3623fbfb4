use collections::{Handle, LinkedList};

use crate::chunk::Chunk;
use crate::error::InvariantViolation;

/// Position of a chunk inside a [`ChunkList`]. Only meaningful for the list
/// that produced it and only until that chunk is removed.
pub type Position = Handle;

/// Address-ordered chunks covering the whole arena.
///
/// The list always satisfies:
/// 1. the first chunk starts at 0 and every chunk ends where the next begins;
/// 2. no two neighbouring chunks are both free;
/// 3. every chunk has a non-zero size;
/// 4. chunk sizes add up to the arena size.
///
/// Mutation is restricted to the crate so that only the allocator's split and
/// merge paths can touch the layout.
pub struct ChunkList {
    chunks: LinkedList<Chunk>,
    arena_size: usize,
}

impl ChunkList {
    /// One free chunk spanning `arena_size` units.
    pub fn new(arena_size: usize) -> Result<Self, InvariantViolation> {
        if arena_size == 0 {
            return Err(InvariantViolation::ZeroSized { address: 0 });
        }
        let mut chunks = LinkedList::new();
        chunks.push_back(Chunk::free(0, arena_size))?;
        Ok(Self { chunks, arena_size })
    }

    /// Rebuilds a list from an explicit layout. The arena size is the sum of
    /// the chunk sizes and the layout must satisfy every list invariant.
    pub fn from_chunks(
        layout: impl IntoIterator<Item = Chunk>,
    ) -> Result<Self, InvariantViolation> {
        let mut chunks = LinkedList::new();
        let mut arena_size = 0usize;
        for chunk in layout {
            arena_size += chunk.size;
            chunks.push_back(chunk)?;
        }
        let list = Self { chunks, arena_size };
        list.check_invariants()?;
        Ok(list)
    }

    pub fn arena_size(&self) -> usize {
        self.arena_size
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn first(&self) -> Option<Position> {
        self.chunks.first()
    }

    pub fn next(&self, position: Position) -> Option<Position> {
        self.chunks.next(position)
    }

    pub fn prev(&self, position: Position) -> Option<Position> {
        self.chunks.prev(position)
    }

    pub fn get(&self, position: Position) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    pub(crate) fn get_mut(&mut self, position: Position) -> Option<&mut Chunk> {
        self.chunks.get_mut(position)
    }

    pub(crate) fn insert_after(
        &mut self,
        position: Position,
        chunk: Chunk,
    ) -> Result<Position, collections::Error> {
        self.chunks.insert_after(position, chunk)
    }

    pub(crate) fn insert_before(
        &mut self,
        position: Position,
        chunk: Chunk,
    ) -> Result<Position, collections::Error> {
        self.chunks.insert_before(position, chunk)
    }

    pub(crate) fn remove(&mut self, position: Position) -> Result<Chunk, collections::Error> {
        self.chunks.remove(position)
    }

    /// Chunks in address order along with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Chunk)> + '_ {
        self.chunks.iter()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter().map(|(_, chunk)| chunk)
    }

    pub fn find_by_address(&self, address: usize) -> Option<Position> {
        self.iter()
            .find(|(_, chunk)| chunk.address == address)
            .map(|(position, _)| position)
    }

    /// Sizes of the free chunks in address order.
    pub fn free_chunk_sizes(&self) -> Vec<usize> {
        self.chunks()
            .filter(|chunk| chunk.is_free())
            .map(|chunk| chunk.size)
            .collect()
    }

    pub fn total_free(&self) -> usize {
        self.chunks()
            .filter(|chunk| chunk.is_free())
            .map(|chunk| chunk.size)
            .sum()
    }

    pub fn largest_free(&self) -> usize {
        self.chunks()
            .filter(|chunk| chunk.is_free())
            .map(|chunk| chunk.size)
            .max()
            .unwrap_or(0)
    }

    /// Returns the first violated invariant, walking in address order.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut previous: Option<&Chunk> = None;
        let mut covered = 0usize;
        for chunk in self.chunks() {
            if chunk.size == 0 {
                return Err(InvariantViolation::ZeroSized {
                    address: chunk.address,
                });
            }
            match previous {
                None if chunk.address != 0 => {
                    return Err(InvariantViolation::FirstAddress(chunk.address));
                }
                Some(prev) if prev.end() != chunk.address => {
                    return Err(InvariantViolation::Discontiguous {
                        expected: prev.end(),
                        address: chunk.address,
                    });
                }
                Some(prev) if prev.is_free() && chunk.is_free() => {
                    return Err(InvariantViolation::AdjacentFree {
                        first: prev.address,
                        second: chunk.address,
                    });
                }
                _ => {}
            }
            covered += chunk.size;
            previous = Some(chunk);
        }

        if previous.is_none() {
            return Err(InvariantViolation::Empty);
        }
        if covered != self.arena_size {
            return Err(InvariantViolation::Coverage {
                covered,
                arena_size: self.arena_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(list: &ChunkList) -> Vec<Chunk> {
        list.chunks().copied().collect()
    }

    #[test]
    fn new_list_holds_one_free_chunk_spanning_the_arena() {
        let list = ChunkList::new(1024).unwrap();
        assert_eq!(layout(&list), vec![Chunk::free(0, 1024)]);
        assert_eq!(list.arena_size(), 1024);
        assert!(list.check_invariants().is_ok());
    }

    #[test]
    fn zero_sized_arena_is_rejected() {
        assert_eq!(
            ChunkList::new(0).err(),
            Some(InvariantViolation::ZeroSized { address: 0 })
        );
    }

    #[test]
    fn from_chunks_accepts_valid_layout() {
        let list = ChunkList::from_chunks([
            Chunk::free(0, 10),
            Chunk::occupied(10, 5),
            Chunk::free(15, 50),
        ])
        .unwrap();

        assert_eq!(list.arena_size(), 65);
        assert_eq!(list.len(), 3);
        assert_eq!(list.free_chunk_sizes(), vec![10, 50]);
        assert_eq!(list.total_free(), 60);
        assert_eq!(list.largest_free(), 50);
    }

    #[test]
    fn from_chunks_rejects_gap() {
        let result = ChunkList::from_chunks([Chunk::occupied(0, 10), Chunk::free(12, 5)]);
        assert_eq!(
            result.err(),
            Some(InvariantViolation::Discontiguous {
                expected: 10,
                address: 12
            })
        );
    }

    #[test]
    fn from_chunks_rejects_overlap() {
        let result = ChunkList::from_chunks([Chunk::occupied(0, 10), Chunk::free(8, 5)]);
        assert!(matches!(
            result,
            Err(InvariantViolation::Discontiguous { .. })
        ));
    }

    #[test]
    fn from_chunks_rejects_adjacent_free_chunks() {
        let result = ChunkList::from_chunks([Chunk::free(0, 10), Chunk::free(10, 5)]);
        assert_eq!(
            result.err(),
            Some(InvariantViolation::AdjacentFree {
                first: 0,
                second: 10
            })
        );
    }

    #[test]
    fn from_chunks_rejects_bad_start_and_empty_layouts() {
        assert_eq!(
            ChunkList::from_chunks([Chunk::free(4, 10)]).err(),
            Some(InvariantViolation::FirstAddress(4))
        );
        assert_eq!(
            ChunkList::from_chunks([]).err(),
            Some(InvariantViolation::Empty)
        );
        assert_eq!(
            ChunkList::from_chunks([Chunk::occupied(0, 0)]).err(),
            Some(InvariantViolation::ZeroSized { address: 0 })
        );
    }

    #[test]
    fn insert_and_remove_at_position() {
        let mut list = ChunkList::new(100).unwrap();
        let whole = list.first().unwrap();

        let head = list.insert_before(whole, Chunk::occupied(0, 30)).unwrap();
        let rest = list.get_mut(whole).unwrap();
        rest.address = 30;
        rest.size = 70;
        assert!(list.check_invariants().is_ok());
        assert_eq!(list.next(head), Some(whole));
        assert_eq!(list.prev(whole), Some(head));

        let removed = list.remove(head).unwrap();
        assert_eq!(removed, Chunk::occupied(0, 30));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(head), None);
    }

    #[test]
    fn insert_after_links_successor() {
        let mut list = ChunkList::from_chunks([Chunk::occupied(0, 40), Chunk::free(40, 60)]).unwrap();
        let tail = list.find_by_address(40).unwrap();

        let appended = list.insert_after(tail, Chunk::occupied(100, 1)).unwrap();

        assert_eq!(list.next(tail), Some(appended));
        assert_eq!(list.next(appended), None);
    }

    #[test]
    fn find_by_address_only_matches_chunk_starts() {
        let list = ChunkList::from_chunks([Chunk::occupied(0, 40), Chunk::free(40, 60)]).unwrap();
        assert!(list.find_by_address(40).is_some());
        assert!(list.find_by_address(41).is_none());
    }

    #[test]
    fn coverage_mismatch_is_reported() {
        let mut list = ChunkList::new(100).unwrap();
        let whole = list.first().unwrap();
        list.get_mut(whole).unwrap().size = 90;

        assert_eq!(
            list.check_invariants(),
            Err(InvariantViolation::Coverage {
                covered: 90,
                arena_size: 100
            })
        );
    }
}
