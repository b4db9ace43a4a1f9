//! Measurement session coordinator.
//!
//! The controller resolves measurement requests into concrete hardware
//! targets, opens sessions through the two transport engines, and thereafter
//! fans `write`/`stop` out to whichever engines have active sessions. It is
//! an explicit instance created by [`MeasureController::initialize`] and
//! threaded through every call; there is no process-global state.
//!
//! Request shapes are tagged enums dispatched with one `match` per transport
//! family, so the fallback-to-discovery behavior is an explicit branch.
//!
//! ## Session flags
//!
//! One `AtomicBool` per transport family records "at least one session of
//! this family is open". A flag is stored only after its engine reports a
//! successful open, and cleared only by [`stop`](MeasureController::stop)
//! (clear-then-stop, so a second `stop` never reaches an engine). Open
//! failures leave the flags untouched. Batch opens run sequentially in list
//! order with no rollback: a mid-batch failure leaves prior opens active.

use crate::device_type::DeviceTypeTag;
use crate::discovery::{DeviceDiscovery, SystemDiscovery};
use crate::driver::{UsbDeviceInfo, UsbSerialDriver, UsbSerialPort};
use crate::engine::{SerialEngine, SerialPortEngine, UsbEngine, UsbPortEngine};
use crate::error::{MeasureError, MeasureResult};
use crate::listener::SharedListener;
use crate::logging;
use crate::params::{SerialMeasureParams, UsbMeasureParams};
use crate::permission::{self, PermissionCallback};
use crate::security::SystemSecurity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// How to pick USB bridge targets for a measurement.
#[derive(Debug)]
pub enum UsbMeasureRequest {
    /// One explicit device, with the chipset tag to drive it with.
    Device {
        /// The device handle.
        device: Arc<UsbDeviceInfo>,
        /// Chipset tag the registry resolves a driver for.
        device_type: DeviceTypeTag,
    },
    /// A list of candidate drivers; `None` re-discovers attached devices.
    Drivers(Option<Vec<UsbSerialDriver>>),
    /// One explicit endpoint; `None` falls back to rediscovery.
    Endpoint(Option<UsbSerialPort>),
}

/// How to pick native serial targets for a measurement.
#[derive(Debug)]
pub enum SerialMeasureRequest {
    /// Use `params.device_path`; an empty path falls back to rediscovery.
    Configured,
    /// A batch of device paths; `None` re-discovers all native paths.
    Paths(Option<Vec<String>>),
}

/// Options for [`MeasureController::initialize`].
pub struct InitOptions {
    /// Whether the process-wide logging subscriber is enabled.
    pub enable_logging: bool,
    /// Whether to launch the fire-and-forget permission pass.
    pub request_permission: bool,
    /// Invoked once with the permission outcome, if requested.
    pub permission_callback: Option<PermissionCallback>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            enable_logging: false,
            request_permission: true,
            permission_callback: None,
        }
    }
}

impl InitOptions {
    /// Enable or disable the logging subscriber.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable the permission pass.
    pub fn with_permission_request(mut self, request: bool) -> Self {
        self.request_permission = request;
        self
    }

    /// Set the permission outcome callback.
    pub fn with_permission_callback(mut self, callback: PermissionCallback) -> Self {
        self.permission_callback = Some(callback);
        self
    }
}

/// Coordinates measurement sessions across the two transport families.
pub struct MeasureController {
    usb_engine: Box<dyn UsbEngine>,
    serial_engine: Box<dyn SerialEngine>,
    discovery: Box<dyn DeviceDiscovery>,
    usb_active: AtomicBool,
    serial_active: AtomicBool,
}

impl MeasureController {
    /// Verify the host, construct fresh engines, and optionally launch the
    /// permission pass.
    ///
    /// # Errors
    /// [`MeasureError::SecurityViolation`] if the host USB subsystem fails
    /// its sanity check; no engines are constructed in that case.
    pub async fn initialize(options: InitOptions) -> MeasureResult<Self> {
        if !SystemSecurity::check() {
            return Err(MeasureError::SecurityViolation);
        }
        logging::init(options.enable_logging);

        let controller = Self::with_engines(
            Box::new(UsbPortEngine::new()),
            Box::new(SerialPortEngine::new()),
        );

        if options.request_permission {
            permission::request_all(options.permission_callback);
        }
        Ok(controller)
    }

    /// Construct a controller over caller-supplied engines.
    ///
    /// Skips the platform checks; this is the seam tests and embedders use
    /// to inject engine implementations.
    pub fn with_engines(
        usb_engine: Box<dyn UsbEngine>,
        serial_engine: Box<dyn SerialEngine>,
    ) -> Self {
        Self {
            usb_engine,
            serial_engine,
            discovery: Box::new(SystemDiscovery),
            usb_active: AtomicBool::new(false),
            serial_active: AtomicBool::new(false),
        }
    }

    /// Replace the device discovery source.
    ///
    /// The rediscovery fallbacks and the scan methods all route through the
    /// installed source; tests inject one the same way they inject engines.
    pub fn with_discovery(mut self, discovery: Box<dyn DeviceDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    /// Snapshot of currently attached USB bridge drivers.
    pub fn scan_usb_drivers(&self) -> MeasureResult<Vec<UsbSerialDriver>> {
        self.discovery.usb_drivers()
    }

    /// Snapshot of natively exposed serial devices, as name -> path.
    pub fn scan_serial_ports(&self) -> MeasureResult<HashMap<String, String>> {
        self.discovery.serial_devices()
    }

    /// Open USB bridge measurement sessions per `request`.
    ///
    /// Batch shapes share `listener` across every opened session. Opening
    /// zero matching drivers is a no-op, not an error.
    pub async fn measure_usb(
        &self,
        request: UsbMeasureRequest,
        params: &UsbMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        match request {
            UsbMeasureRequest::Device {
                device,
                device_type,
            } => {
                let driver = UsbSerialDriver::resolve(device_type, device)?;
                let port = driver.first_port().ok_or_else(|| MeasureError::NoEndpoint {
                    device: driver.device().identity(),
                })?;
                self.open_usb_port(&port, params, listener).await
            }
            UsbMeasureRequest::Endpoint(Some(port)) => {
                self.open_usb_port(&port, params, listener).await
            }
            UsbMeasureRequest::Drivers(list) => {
                self.open_matching_drivers(list, params, listener).await
            }
            // No explicit endpoint: fall back to the driver-list path.
            UsbMeasureRequest::Endpoint(None) => {
                self.open_matching_drivers(None, params, listener).await
            }
        }
    }

    /// Open native serial measurement sessions per `request`.
    ///
    /// Pairing rule for batches: when the listener count equals the path
    /// count, listener `i` serves path `i`; any other combination collapses
    /// to `listeners[0]` for every path. Empty path strings are skipped
    /// without disturbing the index pairing of later entries.
    pub async fn measure_serial(
        &self,
        request: SerialMeasureRequest,
        params: &SerialMeasureParams,
        listeners: &[SharedListener],
    ) -> MeasureResult<()> {
        if listeners.is_empty() {
            return Err(MeasureError::NoListener);
        }
        match request {
            SerialMeasureRequest::Configured => {
                if params.device_path.is_empty() {
                    self.open_serial_batch(None, params, listeners).await
                } else {
                    self.open_serial_path(params, Arc::clone(&listeners[0])).await
                }
            }
            SerialMeasureRequest::Paths(list) => {
                self.open_serial_batch(list, params, listeners).await
            }
        }
    }

    /// Single-target convenience over [`measure_serial`](Self::measure_serial).
    pub async fn measure_serial_single(
        &self,
        params: &SerialMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        self.measure_serial(SerialMeasureRequest::Configured, params, &[listener])
            .await
    }

    /// Forward `data` to every transport family with active sessions.
    ///
    /// A no-op when no session is active; never errors on empty `data`.
    pub async fn write(&self, data: &[Vec<u8>]) -> MeasureResult<()> {
        if self.usb_active.load(Ordering::SeqCst) {
            self.usb_engine.write(data).await?;
        }
        if self.serial_active.load(Ordering::SeqCst) {
            self.serial_engine.write(data).await?;
        }
        Ok(())
    }

    /// Stop every active session and clear both session flags. Idempotent.
    pub async fn stop(&self) -> MeasureResult<()> {
        debug!("measure controller stop");
        if self.usb_active.swap(false, Ordering::SeqCst) {
            self.usb_engine.stop().await?;
        }
        if self.serial_active.swap(false, Ordering::SeqCst) {
            self.serial_engine.stop().await?;
        }
        Ok(())
    }

    /// Whether at least one USB bridge session is open.
    pub fn is_usb_active(&self) -> bool {
        self.usb_active.load(Ordering::SeqCst)
    }

    /// Whether at least one native serial session is open.
    pub fn is_serial_active(&self) -> bool {
        self.serial_active.load(Ordering::SeqCst)
    }

    async fn open_matching_drivers(
        &self,
        list: Option<Vec<UsbSerialDriver>>,
        params: &UsbMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        let drivers = match list {
            Some(drivers) => drivers,
            None => self.discovery.usb_drivers()?,
        };

        let mut opened = 0usize;
        for driver in drivers {
            if !params.device_type.matches(driver.device_type()) {
                continue;
            }
            let Some(port) = driver.first_port() else {
                debug!(device = %driver.device(), "skipping driver with no usable port");
                continue;
            };
            self.open_usb_port(&port, params, Arc::clone(&listener))
                .await?;
            opened += 1;
        }
        if opened == 0 {
            debug!(expected = %params.device_type, "no usb drivers matched; nothing opened");
        }
        Ok(())
    }

    async fn open_serial_batch(
        &self,
        list: Option<Vec<String>>,
        params: &SerialMeasureParams,
        listeners: &[SharedListener],
    ) -> MeasureResult<()> {
        let paths = match list {
            Some(paths) => paths,
            None => self.discovery.serial_paths()?,
        };

        let paired = listeners.len() == paths.len();
        for (index, path) in paths.iter().enumerate() {
            if path.is_empty() {
                warn!(index, "skipping empty device path in batch");
                continue;
            }
            let listener = if paired {
                Arc::clone(&listeners[index])
            } else {
                Arc::clone(&listeners[0])
            };
            let target_params = params.with_path(path);
            self.open_serial_path(&target_params, listener).await?;
        }
        Ok(())
    }

    async fn open_usb_port(
        &self,
        port: &UsbSerialPort,
        params: &UsbMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        self.usb_engine.open(port, params, listener).await?;
        self.usb_active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn open_serial_path(
        &self,
        params: &SerialMeasureParams,
        listener: SharedListener,
    ) -> MeasureResult<()> {
        self.serial_engine.open(params, listener).await?;
        self.serial_active.store(true, Ordering::SeqCst);
        Ok(())
    }
}
