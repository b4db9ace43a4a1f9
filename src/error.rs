//! Custom error types for the crate.
//!
//! This module defines the primary error type, `MeasureError`, used across the
//! resolution and session layers. Using the `thiserror` crate, it provides a
//! centralized way to classify the failures this layer can surface:
//!
//! - **`SecurityViolation`**: the host USB subsystem failed its sanity check
//!   during initialization. Fatal; no engines are constructed.
//! - **`UnknownDeviceType`**: a chipset tag with no registered driver was
//!   passed to the driver registry. The wildcard tag is deliberately in this
//!   category, since it is only ever a match pattern.
//! - **`NoEndpoint`**: a driver resolved for an explicit device exposes no
//!   usable port. Only single-target opens surface this; batch filtering
//!   silently excludes such drivers.
//! - **`NoListener`**: a batch open was requested with an empty listener list.
//! - **`Io` / `Serial`**: wrapped transport-level failures from `std::io` and
//!   the `serialport` crate, created seamlessly via `#[from]` so `?` works
//!   throughout the engines.
//! - **`Engine`**: a background session task failed in a way that has no more
//!   specific classification (e.g. a panicked blocking task).
//!
//! No error in this layer is retried; recovery policy belongs to the caller.

use crate::device_type::DeviceTypeTag;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type MeasureResult<T> = std::result::Result<T, MeasureError>;

/// Errors surfaced by the resolution-and-dispatch layer.
#[derive(Error, Debug)]
pub enum MeasureError {
    /// The host USB subsystem failed its integrity check at initialization.
    #[error("there is an error in the current system usb module")]
    SecurityViolation,

    /// A chipset tag with no registered driver was handed to the registry.
    #[error("unknown usb device type: {0}")]
    UnknownDeviceType(DeviceTypeTag),

    /// A resolved driver exposes no usable port.
    #[error("driver for device {device} exposes no usable port")]
    NoEndpoint {
        /// Human-readable identity of the device whose driver had no port.
        device: String,
    },

    /// A batch open was requested with an empty listener list.
    #[error("at least one measure listener is required")]
    NoListener,

    /// Transport-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the `serialport` crate.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// A background session task failed without a more specific class.
    #[error("engine error: {0}")]
    Engine(String),
}
