pub mod recommendation;
pub mod soil;
