pub mod dto;
pub mod executor;
pub mod fingerprint;
pub mod helpers;
