//! In-memory implementations of the store and cache traits for testing

mod cache;
mod store;


pub use cache::MockRevocationCache;
pub use store::MockCredentialStore;
