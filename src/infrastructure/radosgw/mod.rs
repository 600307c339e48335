//! RADOS gateway admin API adapter.

pub mod client;
pub mod signing;

pub use client::RadosgwAdminClient;
pub use signing::RequestSigner;
