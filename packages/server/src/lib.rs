// Release Desk - API Core
//
// Backend for the music release workflow: artists build DRAFT releases,
// submit them, a background sweep promotes fully uploaded releases into the
// review queue, and admins approve or reject them.
//
// Business logic lives per-domain in domains/*/actions/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
