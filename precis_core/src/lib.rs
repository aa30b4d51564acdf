pub mod ai;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod dependencies;
pub mod error;
pub mod summary;
pub mod task;
pub mod worker;

#[cfg(test)]
mod test_support;
