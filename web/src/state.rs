//! Application state for Axum handlers.

use crate::render::Renderer;
use bookings_core::ReservationWorkflow;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone; holds shared handles only.
#[derive(Clone)]
pub struct AppState {
    /// The reservation workflow (and through it, the repository).
    pub workflow: ReservationWorkflow,
    /// Page renderer.
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(workflow: ReservationWorkflow, renderer: Arc<dyn Renderer>) -> Self {
        Self { workflow, renderer }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("workflow", &self.workflow)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }
}
