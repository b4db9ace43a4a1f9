//! Session listener callbacks.
//!
//! A listener receives everything a session produces: open/close
//! notifications, received data, and faults. Listeners are supplied per call
//! as `Arc<dyn MeasureListener>`; a batch USB open shares one listener across
//! every session it creates, so implementations must be `Send + Sync` and
//! tolerate interleaved callbacks from several sessions.

use std::sync::Arc;

/// Callback surface for one or more measurement sessions.
///
/// `target` is the system port name or device path the callback concerns.
/// Callbacks are invoked from engine-owned background tasks; implementations
/// must not block for long.
pub trait MeasureListener: Send + Sync {
    /// A session was opened on `target`.
    fn on_opened(&self, target: &str) {
        let _ = target;
    }

    /// Data arrived from `target`.
    fn on_data(&self, target: &str, data: &[u8]);

    /// A session on `target` faulted. The session is no longer readable.
    fn on_error(&self, target: &str, message: &str);

    /// The session on `target` was closed by [`stop`](crate::controller::MeasureController::stop).
    fn on_closed(&self, target: &str) {
        let _ = target;
    }
}

/// Shared listener handle as passed into the coordinator.
pub type SharedListener = Arc<dyn MeasureListener>;
