//! Immich REST client — metadata search, album listing and bulk album
//! membership updates.

mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod models;
pub mod session;

pub use client::ImmichClient;
pub use error::ImmichError;
pub use models::Asset;
pub use session::build_http_client;
