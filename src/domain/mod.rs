// Usage records, eligibility rules and aggregation passes
pub mod accounting;

// Exported series catalog and per-cycle snapshot
pub mod metrics;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
