pub mod core;
pub mod mock;
pub mod observability;
pub mod radosgw;

pub use mock::MockAdminApi;
pub use radosgw::RadosgwAdminClient;
