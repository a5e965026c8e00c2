// HTTP routes
pub mod admin;
pub mod health;
pub mod releases;
pub mod storage;
pub mod tracks;

pub use health::*;
