pub mod agents;
pub mod data;
pub mod graph;
pub mod llm;
pub mod tools;
pub mod utils;
