//! Generic caching layer for request memoization.
//!
//! This module provides a backend-agnostic caching mechanism that:
//! - Keys response bodies by endpoint namespace + hashed parameters
//! - Keeps entries for the life of the process (no TTL, no eviction)
//! - Supports dropping one endpoint's entries or everything at once

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, MemoryStorage, NoopStorage};
pub use traits::QueryKey;
