//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers and the gate via the `State`
//! extractor. It holds the provider handle, `None` when the backend env vars
//! are missing, and the cookie `Secure` policy. Nothing in it is mutable: each
//! request stands alone and all persistence lives with the provider.

use std::sync::Arc;

use crate::backend::Backend;
use crate::error::AppError;

/// Shared application state. Clone is required by Axum; the backend handle is
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub backend: Option<Arc<dyn Backend>>,
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Option<Arc<dyn Backend>>, cookie_secure: bool) -> Self {
        Self { backend, cookie_secure }
    }

    /// The provider handle, or the 503 error handlers return without one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::backend_unavailable`] when no backend is configured.
    pub fn backend(&self) -> Result<Arc<dyn Backend>, AppError> {
        self.backend.clone().ok_or_else(AppError::backend_unavailable)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
