pub mod limits;
pub mod pool;
