//! Access-grant probing for attached USB serial devices.
//!
//! The host may deny the process access to individual device nodes (udev
//! rules, group membership). [`request_all`] walks every currently attached
//! bridge endpoint, probes whether a session could be opened on it, and
//! reports the overall outcome through an optional callback. The coordinator
//! fires this and forgets it; it never blocks initialization.

use crate::discovery;
use std::time::Duration;
use tracing::{debug, warn};

/// Invoked once with the overall permission outcome.
pub type PermissionCallback = Box<dyn FnOnce(bool) + Send>;

/// Probe access to all attached USB serial endpoints, fire-and-forget.
///
/// Spawns onto the current Tokio runtime and returns immediately. The
/// callback receives `true` only if every endpoint could be opened.
pub fn request_all(callback: Option<PermissionCallback>) {
    tokio::spawn(async move {
        let granted = tokio::task::spawn_blocking(probe_all)
            .await
            .unwrap_or(false);
        debug!(granted, "usb permission pass finished");
        if let Some(callback) = callback {
            callback(granted);
        }
    });
}

/// Try to open every discovered bridge endpoint once.
fn probe_all() -> bool {
    let drivers = match discovery::scan_usb_drivers() {
        Ok(drivers) => drivers,
        Err(err) => {
            warn!(%err, "usb discovery failed during permission pass");
            return false;
        }
    };

    let mut granted = true;
    for driver in drivers {
        for port in driver.ports() {
            // Open-and-drop probe; serialport opens non-blocking, so a
            // denied node fails fast instead of hanging.
            match serialport::new(port.port_name(), 9600)
                .timeout(Duration::from_millis(50))
                .open()
            {
                Ok(_) => {}
                Err(err) => {
                    warn!(port = port.port_name(), %err, "usb device not accessible");
                    granted = false;
                }
            }
        }
    }
    granted
}
