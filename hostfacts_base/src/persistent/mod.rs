//! Persistent, TTL-bounded storage of resolved facts between runs

pub mod cache;
pub mod error;
pub mod ttl;

pub use cache::{CacheEntry, PersistentCache, CACHE_FORMAT_VERSION};
pub use error::CacheError;
pub use ttl::{parse_ttl, TtlError};
