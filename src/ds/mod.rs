pub mod rank_index;

pub use rank_index::{RankIndex, RankSlot};
