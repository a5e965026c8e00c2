// Common types shared across the domain, kernel and server layers

pub mod auth;
pub mod entity_ids;
pub mod id;

pub use auth::{Actor, AuthError, Role};
pub use entity_ids::*;
pub use id::Id;
