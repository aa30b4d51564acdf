pub mod handler;
pub mod redis_store;
pub mod sled_store;
pub mod store;
