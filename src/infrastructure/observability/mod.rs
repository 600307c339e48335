//! Pull-based exposition of the usage metrics.
//!
//! Every scrape of `/metrics` triggers one poll cycle against the gateway
//! and renders its snapshot in the Prometheus text format.

pub mod exposition;
pub mod server;

pub use exposition::render;
pub use server::{router, serve};
