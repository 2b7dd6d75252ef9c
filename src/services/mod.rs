pub mod consumer;
pub mod queue;
pub mod report;
pub mod stats;
