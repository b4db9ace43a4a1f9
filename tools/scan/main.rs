/*
 * Serial Hardware Scan Tool
 *
 * Lists the USB serial bridge devices and natively exposed serial paths
 * currently visible to this host, exactly as the measurement controller
 * would resolve them.
 *
 * Read-only: this tool never opens a port or writes probe bytes, so it is
 * safe to run next to active sessions.
 */

use serial_daq::discovery::{self, SerialPortFinder};

fn main() {
    println!("USB serial bridge devices:");
    match discovery::scan_usb_drivers() {
        Ok(drivers) if drivers.is_empty() => println!("  (none attached)"),
        Ok(drivers) => {
            for driver in drivers {
                let device = driver.device();
                println!("  {} [{}]", device, driver.device_type());
                for port in driver.ports() {
                    println!("    port {}: {}", port.port_index(), port.port_name());
                }
            }
        }
        Err(err) => println!("  enumeration failed: {err}"),
    }

    println!("\nNative serial devices:");
    match SerialPortFinder::new().all_devices() {
        Ok(devices) if devices.is_empty() => println!("  (none exposed)"),
        Ok(devices) => {
            let mut entries: Vec<_> = devices.into_iter().collect();
            entries.sort();
            for (name, path) in entries {
                println!("  {name}: {path}");
            }
        }
        Err(err) => println!("  enumeration failed: {err}"),
    }
}
