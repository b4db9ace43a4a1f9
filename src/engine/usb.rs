//! Shipped engine for USB bridge endpoints.

use crate::driver::UsbSerialPort;
use crate::engine::pool::SessionPool;
use crate::engine::UsbEngine;
use crate::error::MeasureResult;
use crate::listener::SharedListener;
use crate::params::UsbMeasureParams;
use async_trait::async_trait;
use tracing::debug;

/// Opens and drives sessions on endpoints produced by bridge drivers.
pub struct UsbPortEngine {
    pool: SessionPool,
}

impl UsbPortEngine {
    /// Create an engine with no open sessions.
    pub fn new() -> Self {
        Self {
            pool: SessionPool::new("usb"),
        }
    }
}

impl Default for UsbPortEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsbEngine for UsbPortEngine {
    async fn open(
        &self,
        port: &UsbSerialPort,
        params: &UsbMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        debug!(
            device = %port.device(),
            port = port.port_name(),
            expected = %params.device_type,
            "opening usb bridge session"
        );
        self.pool.open(port.port_name(), &params.link, listener).await
    }

    async fn write(&self, data: &[Vec<u8>]) -> MeasureResult<()> {
        self.pool.write(data).await
    }

    async fn stop(&self) -> MeasureResult<()> {
        self.pool.stop().await
    }
}
