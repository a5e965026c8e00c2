/// Authorization primitives for the two fixed roles.
///
/// ```rust
/// use release_core::common::{Actor, Role, UserId};
///
/// let actor = Actor::new(UserId::new(), Role::Admin);
/// assert!(actor.require(Role::Admin).is_ok());
/// assert!(actor.require(Role::Artist).is_err());
/// ```
///
/// Role checks happen once, where a request enters the domain. Ownership
/// checks live with the release lookup so that "not yours" and "does not
/// exist" stay indistinguishable.

mod actor;
mod errors;

pub use actor::{Actor, Role};
pub use errors::AuthError;
