//! Chipset-variant tags for USB serial bridge devices.
//!
//! Several incompatible USB-to-serial bridge families exist, each needing its
//! own driver. `DeviceTypeTag` is the closed enumeration of the families this
//! crate knows how to drive, plus the `Other` wildcard used during batch
//! matching ("open whatever is plugged in").

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying a USB serial bridge chipset family.
///
/// `Other` is a match wildcard, never a concrete driver: it matches every
/// driver during batch filtering but is rejected by
/// [`UsbSerialDriver::resolve`](crate::driver::UsbSerialDriver::resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceTypeTag {
    /// USB CDC-ACM class device (e.g. Arduino-style virtual COM ports).
    CdcAcm,
    /// Silicon Labs CP210x family.
    Cp21xx,
    /// FTDI FT232/FT2232/FT4232 family.
    Ftdi,
    /// Prolific PL2303 family.
    Pl2303,
    /// QinHeng CH340/CH341 family.
    Ch34x,
    /// Wildcard: matches any bridge family during batch filtering.
    Other,
}

impl DeviceTypeTag {
    /// Whether this tag is the match wildcard.
    pub fn is_wildcard(self) -> bool {
        matches!(self, DeviceTypeTag::Other)
    }

    /// Whether a driver tagged `candidate` satisfies this expected tag.
    ///
    /// Equality matches; the wildcard on the expected side matches everything.
    pub fn matches(self, candidate: DeviceTypeTag) -> bool {
        self == candidate || self.is_wildcard()
    }

    /// Classify a USB vendor id into a bridge family.
    ///
    /// Returns `None` for vendors without a dedicated bridge driver; the
    /// discovery layer treats those as CDC-ACM class devices.
    pub fn from_vid(vid: u16) -> Option<DeviceTypeTag> {
        match vid {
            0x0403 => Some(DeviceTypeTag::Ftdi),
            0x10C4 => Some(DeviceTypeTag::Cp21xx),
            0x067B => Some(DeviceTypeTag::Pl2303),
            0x1A86 | 0x4348 => Some(DeviceTypeTag::Ch34x),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceTypeTag::CdcAcm => "cdc_acm",
            DeviceTypeTag::Cp21xx => "cp21xx",
            DeviceTypeTag::Ftdi => "ftdi",
            DeviceTypeTag::Pl2303 => "pl2303",
            DeviceTypeTag::Ch34x => "ch34x",
            DeviceTypeTag::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_tags_match() {
        assert!(DeviceTypeTag::Ftdi.matches(DeviceTypeTag::Ftdi));
        assert!(!DeviceTypeTag::Ftdi.matches(DeviceTypeTag::Ch34x));
    }

    #[test]
    fn wildcard_matches_everything() {
        for tag in [
            DeviceTypeTag::CdcAcm,
            DeviceTypeTag::Cp21xx,
            DeviceTypeTag::Ftdi,
            DeviceTypeTag::Pl2303,
            DeviceTypeTag::Ch34x,
            DeviceTypeTag::Other,
        ] {
            assert!(DeviceTypeTag::Other.matches(tag));
        }
    }

    #[test]
    fn wildcard_is_one_directional() {
        // A concrete expected tag does not match a wildcard candidate.
        assert!(!DeviceTypeTag::Ftdi.matches(DeviceTypeTag::Other));
    }

    #[test]
    fn known_vendors_classify() {
        assert_eq!(DeviceTypeTag::from_vid(0x0403), Some(DeviceTypeTag::Ftdi));
        assert_eq!(DeviceTypeTag::from_vid(0x10C4), Some(DeviceTypeTag::Cp21xx));
        assert_eq!(DeviceTypeTag::from_vid(0x067B), Some(DeviceTypeTag::Pl2303));
        assert_eq!(DeviceTypeTag::from_vid(0x1A86), Some(DeviceTypeTag::Ch34x));
        assert_eq!(DeviceTypeTag::from_vid(0x4348), Some(DeviceTypeTag::Ch34x));
        assert_eq!(DeviceTypeTag::from_vid(0x2341), None); // Arduino
    }

    #[test]
    fn display_names_are_stable() {
        assert_eq!(DeviceTypeTag::Ftdi.to_string(), "ftdi");
        assert_eq!(DeviceTypeTag::Other.to_string(), "other");
    }
}
