//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by the route
//! layer, the domain actions and the promotion sweep. The release store sits
//! behind a trait so tests can swap in the in-memory implementation.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseReleaseStore, PromotionSignal};

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseReleaseStore>,
    /// JWT service for token verification
    pub jwt_service: Arc<JwtService>,
    /// Wakes the promotion sweep early after a successful submission
    pub promotion: PromotionSignal,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn BaseReleaseStore>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            store,
            jwt_service,
            promotion: PromotionSignal::new(),
        }
    }
}
