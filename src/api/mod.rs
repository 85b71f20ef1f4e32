pub mod cache;
pub mod cached_client;
pub mod client;
pub mod mock;
pub mod request;
pub mod types;
