//! Device-type autodetection from `show version` output.
//!
//! Each signature is a set of banner substrings with a priority. Every
//! signature with at least one matching substring is a candidate and the
//! highest priority wins, so a more specific banner (IOS-XE) beats a
//! generic one (IOS) that also appears in the same output.

use log::debug;

use super::DeviceType;
use crate::error::{PlatformError, Result};

/// Command whose output identifies the device.
pub const DETECT_COMMAND: &str = "show version";

struct Signature {
    device_type: DeviceType,
    patterns: &'static [&'static str],
    priority: u8,
}

const SIGNATURES: &[Signature] = &[
    Signature {
        device_type: DeviceType::CiscoXe,
        patterns: &["Cisco IOS XE Software", "IOS-XE Software"],
        priority: 99,
    },
    Signature {
        device_type: DeviceType::CiscoNxos,
        patterns: &["Cisco Nexus Operating System", "NX-OS"],
        priority: 99,
    },
    Signature {
        device_type: DeviceType::AristaEos,
        patterns: &["Arista"],
        priority: 99,
    },
    Signature {
        device_type: DeviceType::CiscoIos,
        patterns: &[
            "Cisco IOS Software",
            "Cisco Internetwork Operating System Software",
        ],
        priority: 95,
    },
];

/// Pick the device type whose signature best matches `output`.
pub fn detect_device_type(output: &str) -> Result<DeviceType> {
    let mut best: Option<&Signature> = None;

    for signature in SIGNATURES {
        if !signature.patterns.iter().any(|p| output.contains(p)) {
            continue;
        }
        debug!(
            "detect: {} matched with priority {}",
            signature.device_type, signature.priority
        );
        if best.is_none_or(|b| signature.priority > b.priority) {
            best = Some(signature);
        }
    }

    best.map(|s| s.device_type)
        .ok_or_else(|| PlatformError::DetectionFailed.into())
}
