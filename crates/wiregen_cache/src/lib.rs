//! Cross-process build cache for the wiregen generator.
//!
//! The cache is a key/value store backed by locked files, designed for
//! concurrent OS processes (parallel jobs regenerating different services
//! against one shared cache). All access goes through the lock-protected
//! [`BuildCache::get`]/[`BuildCache::update`] primitives; `update` is the
//! only mutation primitive, so concurrent writers always read-modify-write
//! under an exclusive advisory lock and never lose each other's entries.
//!
//! Lock or open failures are fatal ([`CacheError::Unavailable`]) and are
//! never downgraded to a cache miss — a miss would silently force full
//! regeneration while masking a storage fault.

#![warn(missing_docs)]

mod error;
mod store;

pub use error::CacheError;
pub use store::{BuildCache, CacheStorage};
