pub mod catalog;
pub mod snapshot;

pub use catalog::{MetricDef, MetricKind, Series};
pub use snapshot::{FamilySnapshot, MetricSnapshot, Sample};
