//! vCloud Director support.
//!
//! Only the translation from native vApps to common metadata lives here;
//! fetching vApps is left to the provider adapter.

mod mapper;
mod types;

pub use mapper::*;
pub use types::*;
