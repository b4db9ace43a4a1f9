//! Host platform sanity checks.
//!
//! Before any session work is attempted, the coordinator verifies the host's
//! USB subsystem is in a usable state. This is deliberately a coarse boolean
//! probe, not a diagnosis: a failed check aborts initialization with
//! [`SecurityViolation`](crate::error::MeasureError::SecurityViolation) and
//! the caller decides what to do about the host.

use tracing::warn;

/// USB subsystem integrity checker.
pub struct SystemSecurity;

impl SystemSecurity {
    /// Whether the host USB/serial subsystem looks sane.
    ///
    /// On Linux this requires the sysfs USB bus to be mounted and serial
    /// enumeration to succeed; elsewhere the enumeration probe stands alone.
    pub fn check() -> bool {
        if serialport::available_ports().is_err() {
            warn!("serial port enumeration failed; usb subsystem unusable");
            return false;
        }

        #[cfg(target_os = "linux")]
        if !std::path::Path::new("/sys/bus/usb").exists() {
            warn!("/sys/bus/usb is missing; usb subsystem unusable");
            return false;
        }

        true
    }
}
