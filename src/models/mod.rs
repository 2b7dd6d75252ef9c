pub mod hotel;
pub mod report;
