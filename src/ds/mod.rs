pub mod chain;
pub mod intrusive_list;
pub mod slot_arena;

pub use chain::{Chain, ChainLink};
pub use intrusive_list::IntrusiveList;
pub use slot_arena::{SlotArena, SlotId};
