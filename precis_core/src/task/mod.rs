pub mod dto;
pub mod queue;
pub mod redis_queue;
pub mod registry;
pub mod sled_queue;
