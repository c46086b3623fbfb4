use fitalloc::{Allocator, Chunk, ChunkList};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Alloc(usize),
    Free(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..=96).prop_map(Op::Alloc),
        2 => any::<usize>().prop_map(Op::Free),
    ]
}

fn strategy() -> impl Strategy<Value = fitalloc::Strategy> {
    prop_oneof![
        Just(fitalloc::Strategy::BestFit),
        Just(fitalloc::Strategy::WorstFit),
    ]
}

fn layout(list: &ChunkList) -> Vec<Chunk> {
    list.chunks().copied().collect()
}

proptest! {
    /// Every allocate/free sequence leaves a gap-free, overlap-free list with
    /// maximal free chunks that covers the whole arena.
    #[test]
    fn invariants_hold_after_every_operation(
        arena_size in 1usize..=2048,
        fit in strategy(),
        ops in prop::collection::vec(op(), 0..300),
    ) {
        let allocator = Allocator::new(fit);
        let mut list = ChunkList::new(arena_size).unwrap();
        let mut live: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc(size) => {
                    if let Ok(address) = allocator.allocate(&mut list, size) {
                        prop_assert!(!live.contains(&address));
                        live.push(address);
                    }
                }
                Op::Free(pick) if !live.is_empty() => {
                    let address = live.swap_remove(pick % live.len());
                    prop_assert!(allocator.free(&mut list, address).unwrap().is_some());
                }
                Op::Free(_) => {}
            }

            if let Err(violation) = list.check_invariants() {
                prop_assert!(false, "{violation}: {:?}", layout(&list));
            }
            let covered: usize = list.chunks().map(|chunk| chunk.size).sum();
            prop_assert_eq!(covered, arena_size);
            let occupied = list.chunks().filter(|chunk| !chunk.is_free()).count();
            prop_assert_eq!(occupied, live.len());
        }
    }

    /// Freeing everything that is live always collapses back to one chunk.
    #[test]
    fn freeing_everything_restores_a_single_free_chunk(
        arena_size in 1usize..=2048,
        fit in strategy(),
        sizes in prop::collection::vec(1usize..=128, 0..64),
        order in any::<u64>(),
    ) {
        let allocator = Allocator::new(fit);
        let mut list = ChunkList::new(arena_size).unwrap();
        let mut live: Vec<usize> = sizes
            .into_iter()
            .filter_map(|size| allocator.allocate(&mut list, size).ok())
            .collect();

        let mut state = order | 1;
        while !live.is_empty() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let address = live.swap_remove((state % live.len() as u64) as usize);
            allocator.free(&mut list, address).unwrap();
        }

        prop_assert_eq!(layout(&list), vec![Chunk::free(0, arena_size)]);
    }

    /// A failed request means no single free chunk was large enough.
    #[test]
    fn out_of_memory_only_when_no_chunk_fits(
        fit in strategy(),
        sizes in prop::collection::vec(1usize..=200, 1..40),
    ) {
        let allocator = Allocator::new(fit);
        let mut list = ChunkList::new(1024).unwrap();

        for size in sizes {
            let largest_before = list.largest_free();
            match allocator.allocate(&mut list, size) {
                Ok(_) => prop_assert!(size <= largest_before),
                Err(err) => {
                    prop_assert!(err.is_out_of_memory());
                    prop_assert!(size > largest_before);
                }
            }
        }
    }
}
