//! Driver registry for USB serial bridge devices.
//!
//! Maps a [`DeviceTypeTag`] to a transport driver able to produce serial
//! endpoints for a USB device handle. The driver is a closed sum type over the
//! five chipset families, so a sixth family cannot be silently unhandled: all
//! matching in this crate is exhaustive.
//!
//! Driver construction has no side effects. Opening the endpoints a driver
//! exposes is the session engines' job.

use crate::device_type::DeviceTypeTag;
use crate::error::{MeasureError, MeasureResult};
use std::fmt;
use std::sync::Arc;

/// A USB device handle as this layer sees it.
///
/// Ownership of the underlying platform device is shared, never exclusive:
/// handles travel as `Arc<UsbDeviceInfo>` between discovery, the registry and
/// the endpoints a driver produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    /// USB vendor id.
    pub vid: u16,
    /// USB product id.
    pub pid: u16,
    /// Serial number reported by the device, if any.
    pub serial_number: Option<String>,
    /// Product string reported by the device, if any.
    pub product: Option<String>,
    /// System port names the kernel bound for this device, in index order.
    ///
    /// Multi-port bridges (e.g. FT4232) contribute several entries.
    pub port_names: Vec<String>,
}

impl UsbDeviceInfo {
    /// Short `vid:pid` identity used in logs and error messages.
    pub fn identity(&self) -> String {
        format!("{:04x}:{:04x}", self.vid, self.pid)
    }
}

impl fmt::Display for UsbDeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.product {
            Some(product) => write!(f, "{} ({})", self.identity(), product),
            None => f.write_str(&self.identity()),
        }
    }
}

/// One concrete communication endpoint produced by a driver.
#[derive(Debug, Clone)]
pub struct UsbSerialPort {
    device: Arc<UsbDeviceInfo>,
    port_name: String,
    port_index: usize,
}

impl UsbSerialPort {
    /// The device this endpoint belongs to.
    pub fn device(&self) -> &Arc<UsbDeviceInfo> {
        &self.device
    }

    /// System port name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Index of this port on its device.
    pub fn port_index(&self) -> usize {
        self.port_index
    }
}

/// Transport driver for one USB serial bridge device.
///
/// One variant per chipset family; the wildcard tag has no variant and is
/// rejected by [`UsbSerialDriver::resolve`].
#[derive(Debug, Clone)]
pub enum UsbSerialDriver {
    /// CDC-ACM class driver.
    CdcAcm(Arc<UsbDeviceInfo>),
    /// Silicon Labs CP210x driver.
    Cp21xx(Arc<UsbDeviceInfo>),
    /// FTDI driver.
    Ftdi(Arc<UsbDeviceInfo>),
    /// Prolific PL2303 driver.
    Pl2303(Arc<UsbDeviceInfo>),
    /// QinHeng CH34x driver.
    Ch34x(Arc<UsbDeviceInfo>),
}

impl UsbSerialDriver {
    /// Resolve the driver for `device_type`, bound to `device`.
    ///
    /// # Errors
    /// Returns [`MeasureError::UnknownDeviceType`] for the wildcard tag, which
    /// is only ever a match pattern, never a construction target.
    pub fn resolve(
        device_type: DeviceTypeTag,
        device: Arc<UsbDeviceInfo>,
    ) -> MeasureResult<UsbSerialDriver> {
        match device_type {
            DeviceTypeTag::CdcAcm => Ok(UsbSerialDriver::CdcAcm(device)),
            DeviceTypeTag::Cp21xx => Ok(UsbSerialDriver::Cp21xx(device)),
            DeviceTypeTag::Ftdi => Ok(UsbSerialDriver::Ftdi(device)),
            DeviceTypeTag::Pl2303 => Ok(UsbSerialDriver::Pl2303(device)),
            DeviceTypeTag::Ch34x => Ok(UsbSerialDriver::Ch34x(device)),
            DeviceTypeTag::Other => Err(MeasureError::UnknownDeviceType(device_type)),
        }
    }

    /// The chipset family this driver serves.
    pub fn device_type(&self) -> DeviceTypeTag {
        match self {
            UsbSerialDriver::CdcAcm(_) => DeviceTypeTag::CdcAcm,
            UsbSerialDriver::Cp21xx(_) => DeviceTypeTag::Cp21xx,
            UsbSerialDriver::Ftdi(_) => DeviceTypeTag::Ftdi,
            UsbSerialDriver::Pl2303(_) => DeviceTypeTag::Pl2303,
            UsbSerialDriver::Ch34x(_) => DeviceTypeTag::Ch34x,
        }
    }

    /// The device handle this driver is bound to.
    pub fn device(&self) -> &Arc<UsbDeviceInfo> {
        match self {
            UsbSerialDriver::CdcAcm(device)
            | UsbSerialDriver::Cp21xx(device)
            | UsbSerialDriver::Ftdi(device)
            | UsbSerialDriver::Pl2303(device)
            | UsbSerialDriver::Ch34x(device) => device,
        }
    }

    /// All endpoints this driver exposes, in port-index order.
    pub fn ports(&self) -> Vec<UsbSerialPort> {
        let device = self.device();
        device
            .port_names
            .iter()
            .enumerate()
            .map(|(port_index, port_name)| UsbSerialPort {
                device: Arc::clone(device),
                port_name: port_name.clone(),
                port_index,
            })
            .collect()
    }

    /// The first endpoint, which is the one measurement sessions use.
    pub fn first_port(&self) -> Option<UsbSerialPort> {
        self.ports().into_iter().next()
    }
}
