pub mod grid;
pub mod protocol;
pub mod tuning;
