//! Device types and their CLI behaviour.
//!
//! A [`DeviceType`] names the command dialect of a switch. Its
//! [`PlatformDefinition`] tells the SSH backend how prompts look, how to
//! enter configuration mode, how to save, and which output means failure.

mod definition;
pub mod detect;
pub mod vendors;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use definition::{PlatformDefinition, base_prompt, is_user_exec};
pub use detect::detect_device_type;

use crate::error::PlatformError;

/// Command dialect of a managed switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    CiscoIos,
    CiscoXe,
    CiscoNxos,
    AristaEos,
}

impl DeviceType {
    /// All supported device types.
    pub const ALL: [DeviceType; 4] = [
        DeviceType::CiscoIos,
        DeviceType::CiscoXe,
        DeviceType::CiscoNxos,
        DeviceType::AristaEos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoXe => "cisco_xe",
            DeviceType::CiscoNxos => "cisco_nxos",
            DeviceType::AristaEos => "arista_eos",
        }
    }

    /// Session behaviour for this device type.
    pub fn platform(&self) -> PlatformDefinition {
        match self {
            DeviceType::CiscoIos => vendors::cisco::ios(),
            DeviceType::CiscoXe => vendors::cisco::xe(),
            DeviceType::CiscoNxos => vendors::cisco::nxos(),
            DeviceType::AristaEos => vendors::arista::platform(),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PlatformError::UnknownDeviceType {
                name: s.to_string(),
            })
    }
}
