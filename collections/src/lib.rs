pub mod generational_arena;
pub mod linked_list;

pub use generational_arena::{Error, GenArena, Handle};
pub use linked_list::LinkedList;
