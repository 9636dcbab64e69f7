pub mod primary;

pub use primary::{PrimaryIndex, Resident};
