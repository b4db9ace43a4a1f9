//! Communication parameters for measurement sessions.
//!
//! Two shapes exist, one per transport family: [`UsbMeasureParams`] carries
//! the expected chipset tag, [`SerialMeasureParams`] carries a device path.
//! Both embed the same [`LinkSettings`]. Parameter values are owned by the
//! caller and borrowed for the duration of an open call.
//!
//! Batch serial opens never mutate a shared parameter value: each target gets
//! a fresh copy via [`SerialMeasureParams::with_path`].

use crate::device_type::DeviceTypeTag;
use serde::{Deserialize, Serialize};
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::time::Duration;

/// Serial link settings shared by both transport families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Baud rate (e.g. 9600, 115200).
    pub baud_rate: u32,
    /// Data bits per character (5-8).
    pub data_bits: u8,
    /// Stop bits (1 or 2).
    pub stop_bits: u8,
    /// Parity mode.
    pub parity: ParityMode,
    /// Flow control mode.
    pub flow_control: FlowControlMode,
    /// Read timeout in milliseconds for the underlying port handle.
    pub read_timeout_ms: u64,
}

/// Parity setting for a serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityMode {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Flow control setting for a serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlMode {
    /// No flow control.
    None,
    /// XON/XOFF software flow control.
    Software,
    /// RTS/CTS hardware flow control.
    Hardware,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: ParityMode::None,
            flow_control: FlowControlMode::None,
            read_timeout_ms: 1000,
        }
    }
}

impl LinkSettings {
    /// Set the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the data bits per character.
    pub fn with_data_bits(mut self, data_bits: u8) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Set the stop bits.
    pub fn with_stop_bits(mut self, stop_bits: u8) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set the parity mode.
    pub fn with_parity(mut self, parity: ParityMode) -> Self {
        self.parity = parity;
        self
    }

    /// Set the flow control mode.
    pub fn with_flow_control(mut self, flow_control: FlowControlMode) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub(crate) fn serialport_data_bits(&self) -> DataBits {
        match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        }
    }

    pub(crate) fn serialport_stop_bits(&self) -> StopBits {
        match self.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        }
    }

    pub(crate) fn serialport_parity(&self) -> Parity {
        match self.parity {
            ParityMode::None => Parity::None,
            ParityMode::Odd => Parity::Odd,
            ParityMode::Even => Parity::Even,
        }
    }

    pub(crate) fn serialport_flow_control(&self) -> FlowControl {
        match self.flow_control {
            FlowControlMode::None => FlowControl::None,
            FlowControlMode::Software => FlowControl::Software,
            FlowControlMode::Hardware => FlowControl::Hardware,
        }
    }
}

/// Parameters for opening sessions against USB bridge devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbMeasureParams {
    /// Expected chipset tag; [`DeviceTypeTag::Other`] matches every driver.
    pub device_type: DeviceTypeTag,
    /// Serial link settings applied to each opened endpoint.
    pub link: LinkSettings,
}

impl UsbMeasureParams {
    /// Parameters expecting `device_type` with default link settings.
    pub fn new(device_type: DeviceTypeTag) -> Self {
        Self {
            device_type,
            link: LinkSettings::default(),
        }
    }

    /// Replace the link settings.
    pub fn with_link(mut self, link: LinkSettings) -> Self {
        self.link = link;
        self
    }
}

/// Parameters for opening sessions against native serial device paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialMeasureParams {
    /// Target device path; empty means "unset, discover targets instead".
    pub device_path: String,
    /// Serial link settings applied to the opened path.
    pub link: LinkSettings,
}

impl SerialMeasureParams {
    /// Parameters targeting `device_path` with default link settings.
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            link: LinkSettings::default(),
        }
    }

    /// Parameters with no target path, triggering discovery on open.
    pub fn unset() -> Self {
        Self::new("")
    }

    /// Replace the link settings.
    pub fn with_link(mut self, link: LinkSettings) -> Self {
        self.link = link;
        self
    }

    /// A fresh parameter value retargeted at `path`.
    ///
    /// Batch opens call this once per target instead of rewriting a shared
    /// instance, so concurrent opens can never alias each other's path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            device_path: path.into(),
            link: self.link.clone(),
        }
    }
}
