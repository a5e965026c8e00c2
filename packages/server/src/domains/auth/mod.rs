//! Auth domain - bearer token issuing and verification
//!
//! Users are managed elsewhere; this service only trusts tokens signed with
//! the shared secret and reads the caller's id and role from them.

pub mod jwt;

pub use jwt::{Claims, JwtService};
