//! Caching subsystem.
//!
//! - [`response::ResponseCache`]: bounded store of provider responses with
//!   lazy TTL expiry and oldest-first eviction. Owned by the
//!   [`Gateway`](crate::Gateway) and consulted before every dispatch.

pub mod response;

pub use response::{CacheConfig, CacheEntry, CacheKey, ResponseCache};
