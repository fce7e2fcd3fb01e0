//! Cache module for Redis-based caching
//!
//! Holds the shared Redis client and the access-token revocation cache built
//! on it.

pub mod redis_client;
pub mod revocation_cache;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use revocation_cache::RedisRevocationCache;
