//! # serial-daq
//!
//! Measurement session coordination for physically attached hardware reached
//! through two transport families: USB serial bridge chips (FTDI, CP210x,
//! PL2303, CH34x, CDC-ACM — each family needing its own driver) and natively
//! exposed serial device paths. For a measurement request the crate resolves
//! which concrete targets are involved, selects the correct driver and engine
//! for each, opens sessions, and routes write/stop operations to whichever
//! sessions are active, independent of which family served the request.
//!
//! ## Crate Structure
//!
//! - **`controller`**: the `MeasureController` core — request resolution,
//!   listener pairing, and cross-engine session bookkeeping.
//! - **`device_type`**: the closed `DeviceTypeTag` enumeration of bridge
//!   chipset families plus the match wildcard.
//! - **`driver`**: the driver registry — `UsbSerialDriver` as a closed sum
//!   type over the chipset families, producing `UsbSerialPort` endpoints for
//!   a shared `UsbDeviceInfo` handle.
//! - **`discovery`**: the `DeviceDiscovery` snapshot trait plus the live
//!   host sources (`scan_usb_drivers`, `SerialPortFinder`).
//! - **`engine`**: the `UsbEngine`/`SerialEngine` traits the controller
//!   dispatches to, plus the shipped `serialport`-backed implementations.
//! - **`params`**: per-call communication parameters (`LinkSettings` and the
//!   two family-specific shapes).
//! - **`listener`**: the `MeasureListener` callback trait sessions report to.
//! - **`security`** / **`permission`**: host platform collaborators — the
//!   USB subsystem sanity check and the fire-and-forget access-grant pass.
//! - **`error`**: the `MeasureError` type for centralized error handling.
//! - **`logging`**: the process-wide tracing toggle.
//!
//! ## Example
//!
//! ```no_run
//! use serial_daq::{
//!     DeviceTypeTag, InitOptions, MeasureController, MeasureListener, UsbMeasureParams,
//!     UsbMeasureRequest,
//! };
//! use std::sync::Arc;
//!
//! struct PrintListener;
//!
//! impl MeasureListener for PrintListener {
//!     fn on_data(&self, target: &str, data: &[u8]) {
//!         println!("{target}: {} bytes", data.len());
//!     }
//!     fn on_error(&self, target: &str, message: &str) {
//!         eprintln!("{target}: {message}");
//!     }
//! }
//!
//! # async fn run() -> serial_daq::MeasureResult<()> {
//! let controller = MeasureController::initialize(InitOptions::default()).await?;
//!
//! // Open a session on every attached FTDI bridge.
//! let params = UsbMeasureParams::new(DeviceTypeTag::Ftdi);
//! controller
//!     .measure_usb(UsbMeasureRequest::Drivers(None), &params, Arc::new(PrintListener))
//!     .await?;
//!
//! controller.write(&[b"*IDN?\r\n".to_vec()]).await?;
//! controller.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod device_type;
pub mod discovery;
pub mod driver;
pub mod engine;
pub mod error;
pub mod listener;
pub mod logging;
pub mod params;
pub mod permission;
pub mod security;

pub use controller::{InitOptions, MeasureController, SerialMeasureRequest, UsbMeasureRequest};
pub use device_type::DeviceTypeTag;
pub use discovery::{DeviceDiscovery, SerialPortFinder, SystemDiscovery};
pub use driver::{UsbDeviceInfo, UsbSerialDriver, UsbSerialPort};
pub use error::{MeasureError, MeasureResult};
pub use listener::{MeasureListener, SharedListener};
pub use params::{FlowControlMode, LinkSettings, ParityMode, SerialMeasureParams, UsbMeasureParams};
