// Poll cycle orchestration
pub mod collector;

// Aggregation context to metric snapshot
pub mod snapshot_builder;
