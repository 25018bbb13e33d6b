pub mod charset;
pub mod client;
pub mod errors;
pub mod types;

pub use client::{Fetcher, shared_client};
pub use errors::FetchError;
pub use types::PageResponse;
