//! Single-slot position-changed listener
//!
//! The listener runs synchronously on the event-loop thread every time the
//! window moves, so it must return quickly. Failures are logged and
//! dropped. A listener that moves a window from inside its own callback is
//! not re-invoked for the nested move.

use std::cell::RefCell;
use std::error::Error;

use tracing::{debug, warn};

use crate::domain::core::Rect;

/// Callback receiving the window's bounds after a move
pub type PositionListener = Box<dyn FnMut(Rect) -> Result<(), Box<dyn Error>>>;

/// Holds at most one listener; registering replaces the previous one
#[derive(Default)]
pub struct PositionListenerSlot {
    listener: RefCell<Option<PositionListener>>,
    /// Replacement requested while the current listener was running
    pending: RefCell<Option<Option<PositionListener>>>,
}

impl PositionListenerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `listener`, replacing any previous one
    pub fn replace(&self, listener: Option<PositionListener>) {
        match self.listener.try_borrow_mut() {
            Ok(mut slot) => *slot = listener,
            // Called from inside the running listener; applied once it returns
            Err(_) => *self.pending.borrow_mut() = Some(listener),
        }
    }

    pub fn is_registered(&self) -> bool {
        match self.listener.try_borrow() {
            Ok(slot) => slot.is_some(),
            Err(_) => true,
        }
    }

    /// Invokes the listener if one is registered and not already running
    pub fn notify(&self, bounds: Rect) {
        let Ok(mut slot) = self.listener.try_borrow_mut() else {
            debug!(event = "window.position_listener_reentered", ?bounds);
            return;
        };

        if let Some(listener) = slot.as_mut() {
            if let Err(error) = listener(bounds) {
                warn!(
                    event = "window.position_listener_failed",
                    error = %error,
                    ?bounds
                );
            }
        }

        if let Some(replacement) = self.pending.borrow_mut().take() {
            *slot = replacement;
        }
    }
}
