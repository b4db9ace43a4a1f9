//! Session engines for the two transport families.
//!
//! The coordinator talks to engines through two narrow async traits, one per
//! family, and never sees engine internals. The shipped implementations
//! ([`UsbPortEngine`], [`SerialPortEngine`]) drive real ports via the
//! `serialport` crate on Tokio's blocking executor; tests inject mocks
//! through the same traits.
//!
//! An engine owns every session opened through it: `write` and `stop`
//! operate on all of them at once.

use crate::driver::UsbSerialPort;
use crate::error::MeasureResult;
use crate::listener::SharedListener;
use crate::params::{SerialMeasureParams, UsbMeasureParams};
use async_trait::async_trait;

mod pool;
mod serial;
mod usb;

pub use serial::SerialPortEngine;
pub use usb::UsbPortEngine;

/// Session engine for USB bridge endpoints.
#[async_trait]
pub trait UsbEngine: Send + Sync {
    /// Open one session on `port`. Fast handshake; actual I/O runs on
    /// engine-owned background tasks.
    async fn open(
        &self,
        port: &UsbSerialPort,
        params: &UsbMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()>;

    /// Forward `data` to every session this engine owns.
    async fn write(&self, data: &[Vec<u8>]) -> MeasureResult<()>;

    /// Close every session this engine owns.
    async fn stop(&self) -> MeasureResult<()>;
}

/// Session engine for native serial device paths.
#[async_trait]
pub trait SerialEngine: Send + Sync {
    /// Open one session on `params.device_path`.
    async fn open(
        &self,
        params: &SerialMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()>;

    /// Forward `data` to every session this engine owns.
    async fn write(&self, data: &[Vec<u8>]) -> MeasureResult<()>;

    /// Close every session this engine owns.
    async fn stop(&self) -> MeasureResult<()>;
}
