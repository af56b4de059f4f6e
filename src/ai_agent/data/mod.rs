pub mod document;
pub mod metrics;
pub mod normalize;
pub mod report;
