//! Device and driver discovery.
//!
//! Two synchronous snapshot views of the host, with no caching between calls:
//!
//! - [`scan_usb_drivers`] enumerates currently attached USB serial bridge
//!   devices and yields one resolved [`UsbSerialDriver`] per physical device.
//! - [`SerialPortFinder`] enumerates natively exposed serial device paths,
//!   on Linux by walking `/proc/tty/drivers` the way classic serial tooling
//!   does, elsewhere by falling back to `serialport` enumeration.
//!
//! Both views sit behind the [`DeviceDiscovery`] trait so the controller's
//! rediscovery fallbacks can be driven by an injected source.

use crate::device_type::DeviceTypeTag;
use crate::driver::{UsbDeviceInfo, UsbSerialDriver};
use crate::error::MeasureResult;
use serialport::{SerialPortInfo, SerialPortType};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Source of attached-device snapshots.
///
/// The controller takes its snapshots through this trait, so its
/// rediscovery fallbacks have the same injection seam as the engines.
/// Production code uses [`SystemDiscovery`].
pub trait DeviceDiscovery: Send + Sync {
    /// Snapshot of attached USB bridge drivers.
    fn usb_drivers(&self) -> MeasureResult<Vec<UsbSerialDriver>>;

    /// Snapshot of natively exposed serial devices, as device name -> path.
    fn serial_devices(&self) -> MeasureResult<HashMap<String, String>>;

    /// Snapshot of natively exposed serial device paths, in stable order.
    fn serial_paths(&self) -> MeasureResult<Vec<String>>;
}

/// Live host discovery over [`scan_usb_drivers`] and [`SerialPortFinder`].
#[derive(Debug, Default)]
pub struct SystemDiscovery;

impl DeviceDiscovery for SystemDiscovery {
    fn usb_drivers(&self) -> MeasureResult<Vec<UsbSerialDriver>> {
        scan_usb_drivers()
    }

    fn serial_devices(&self) -> MeasureResult<HashMap<String, String>> {
        SerialPortFinder::new().all_devices()
    }

    fn serial_paths(&self) -> MeasureResult<Vec<String>> {
        SerialPortFinder::new().all_device_paths()
    }
}

/// Snapshot of all attached USB serial bridge devices as resolved drivers.
///
/// Ports are grouped by (vendor id, product id, serial number) so a
/// multi-port bridge yields one driver carrying several endpoints. Vendors
/// without a dedicated bridge driver are treated as CDC-ACM class devices.
pub fn scan_usb_drivers() -> MeasureResult<Vec<UsbSerialDriver>> {
    drivers_from_ports(serialport::available_ports()?)
}

fn drivers_from_ports(ports: Vec<SerialPortInfo>) -> MeasureResult<Vec<UsbSerialDriver>> {
    // Group by physical device; BTreeMap keeps the snapshot order stable.
    // Devices reporting no serial number are keyed by their port node, so
    // two identical serial-less units stay distinct.
    let mut devices: BTreeMap<(u16, u16, String), (Option<String>, Option<String>, Vec<String>)> =
        BTreeMap::new();
    for port in ports {
        if let SerialPortType::UsbPort(usb) = port.port_type {
            let key_serial = usb
                .serial_number
                .clone()
                .unwrap_or_else(|| format!("@{}", port.port_name));
            let entry = devices
                .entry((usb.vid, usb.pid, key_serial))
                .or_insert_with(|| (usb.serial_number.clone(), usb.product.clone(), Vec::new()));
            entry.2.push(port.port_name);
        }
    }

    let mut drivers = Vec::with_capacity(devices.len());
    for ((vid, pid, _), (serial_number, product, mut port_names)) in devices {
        port_names.sort();
        let device_type = DeviceTypeTag::from_vid(vid).unwrap_or(DeviceTypeTag::CdcAcm);
        let device = Arc::new(UsbDeviceInfo {
            vid,
            pid,
            serial_number,
            product,
            port_names,
        });
        debug!(device = %device, %device_type, "discovered usb serial device");
        drivers.push(UsbSerialDriver::resolve(device_type, device)?);
    }
    Ok(drivers)
}

/// Enumerator for natively exposed serial device paths.
#[derive(Debug, Default)]
pub struct SerialPortFinder;

impl SerialPortFinder {
    /// Create a finder.
    pub fn new() -> Self {
        Self
    }

    /// All serial devices currently exposed, as device name -> path.
    pub fn all_devices(&self) -> MeasureResult<HashMap<String, String>> {
        let mut devices = HashMap::new();

        #[cfg(target_os = "linux")]
        if let Ok(text) = std::fs::read_to_string("/proc/tty/drivers") {
            for entry in parse_tty_drivers(&text) {
                for path in entry.device_paths() {
                    if let Some(name) = path.rsplit('/').next() {
                        devices.insert(name.to_string(), path.clone());
                    }
                }
            }
        }

        // Fold in anything serialport enumeration knows about that is not a
        // USB bridge; those belong to the bridge transport family.
        for port in serialport::available_ports()? {
            if !matches!(port.port_type, SerialPortType::UsbPort(_)) {
                let name = port
                    .port_name
                    .rsplit('/')
                    .next()
                    .unwrap_or(port.port_name.as_str())
                    .to_string();
                devices.entry(name).or_insert(port.port_name);
            }
        }

        Ok(devices)
    }

    /// All serial device paths currently exposed, in stable order.
    pub fn all_device_paths(&self) -> MeasureResult<Vec<String>> {
        let mut paths: Vec<String> = self.all_devices()?.into_values().collect();
        paths.sort();
        Ok(paths)
    }
}

/// One `serial`-type entry from `/proc/tty/drivers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TtyDriverEntry {
    /// Driver name (e.g. `serial`, `usbserial`).
    pub name: String,
    /// Device node prefix (e.g. `/dev/ttyS`).
    pub node_prefix: String,
}

impl TtyDriverEntry {
    /// Existing `/dev` nodes matching this driver's prefix.
    fn device_paths(&self) -> Vec<String> {
        let Some((dir, stem)) = self.node_prefix.rsplit_once('/') else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut paths: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|file| file.starts_with(stem) && file.len() > stem.len())
            .map(|file| format!("{dir}/{file}"))
            .collect();
        paths.sort();
        paths
    }
}

/// Parse `/proc/tty/drivers`, keeping only `serial`-type drivers.
///
/// Line format: `driver-name  node-prefix  major  minor-range  type`.
pub(crate) fn parse_tty_drivers(text: &str) -> Vec<TtyDriverEntry> {
    text.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 || *fields.last()? != "serial" {
                return None;
            }
            Some(TtyDriverEntry {
                name: fields[0].to_string(),
                node_prefix: fields[1].to_string(),
            })
        })
        .collect()
}
