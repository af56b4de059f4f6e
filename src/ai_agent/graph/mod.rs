pub mod graph;
pub mod state;
