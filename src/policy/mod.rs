pub mod rank;

pub use rank::{InsertOutcome, RankCore};
