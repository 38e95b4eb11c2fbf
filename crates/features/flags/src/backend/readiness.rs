use super::BackendListener;
use crate::error::ToggleError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Set once by the first successful sync, never cleared.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is ready from the start, for static backends.
    #[must_use]
    pub fn ready() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns `true` only for the call that flipped the flag.
    pub fn mark_ready(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

impl BackendListener for Readiness {
    fn on_ready(&self) {
        if self.mark_ready() {
            info!("Flag backend is ready");
        }
    }

    fn on_error(&self, error: &ToggleError) {
        error!(error = %error, "Flag backend error");
    }

    fn on_warning(&self, message: &str) {
        warn!(message, "Flag backend warning");
    }
}
