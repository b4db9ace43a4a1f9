//! Shipped engine for native serial device paths.

use crate::engine::pool::SessionPool;
use crate::engine::SerialEngine;
use crate::error::{MeasureError, MeasureResult};
use crate::listener::SharedListener;
use crate::params::SerialMeasureParams;
use async_trait::async_trait;
use tracing::debug;

/// Opens and drives sessions on natively exposed serial device paths.
pub struct SerialPortEngine {
    pool: SessionPool,
}

impl SerialPortEngine {
    /// Create an engine with no open sessions.
    pub fn new() -> Self {
        Self {
            pool: SessionPool::new("serial"),
        }
    }
}

impl Default for SerialPortEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SerialEngine for SerialPortEngine {
    async fn open(
        &self,
        params: &SerialMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        if params.device_path.is_empty() {
            return Err(MeasureError::Engine(
                "serial open requires a device path".into(),
            ));
        }
        debug!(path = params.device_path.as_str(), "opening native serial session");
        self.pool
            .open(&params.device_path, &params.link, listener)
            .await
    }

    async fn write(&self, data: &[Vec<u8>]) -> MeasureResult<()> {
        self.pool.write(data).await
    }

    async fn stop(&self) -> MeasureResult<()> {
        self.pool.stop().await
    }
}
