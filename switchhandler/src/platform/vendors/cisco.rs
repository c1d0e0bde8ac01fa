//! Cisco IOS, IOS-XE and NX-OS platform definitions.
//!
//! # Prompt Examples
//!
//! ```text
//! switch>                     # user exec
//! switch#                     # privileged exec
//! switch(config)#             # global configuration
//! switch(config-vlan)#        # vlan sub-mode
//! switch(config-if)#          # interface sub-mode
//! ```

use super::IOS_STYLE_PROMPT;
use crate::platform::{DeviceType, PlatformDefinition};

fn ios_family(device_type: DeviceType) -> PlatformDefinition {
    PlatformDefinition::new(device_type, IOS_STYLE_PROMPT.clone())
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Unknown command")
        .with_failure_pattern("may not have its name changed")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
}

/// Classic IOS (Catalyst 2960/3750 class switches).
pub fn ios() -> PlatformDefinition {
    ios_family(DeviceType::CiscoIos)
}

/// IOS-XE (Catalyst 3650/9300 class switches).
pub fn xe() -> PlatformDefinition {
    ios_family(DeviceType::CiscoXe)
}

/// NX-OS (Nexus switches). Saving needs the long form of the copy command.
pub fn nxos() -> PlatformDefinition {
    PlatformDefinition::new(DeviceType::CiscoNxos, IOS_STYLE_PROMPT.clone())
        .with_save_command("copy running-config startup-config")
        .with_failure_pattern("% Invalid command")
        .with_failure_pattern("% Invalid number")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("ERROR:")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_platform() {
        let platform = ios();
        assert_eq!(platform.device_type, DeviceType::CiscoIos);
        assert_eq!(platform.save_command, "write memory");
        assert_eq!(platform.config_enter, "configure terminal");
        assert_eq!(platform.config_exit, "end");
        assert_eq!(
            platform.on_open_commands,
            vec!["terminal length 0".to_string(), "terminal width 511".to_string()]
        );
    }

    #[test]
    fn test_xe_shares_ios_behaviour() {
        let platform = xe();
        assert_eq!(platform.device_type, DeviceType::CiscoXe);
        assert_eq!(platform.failed_when_contains, ios().failed_when_contains);
    }

    #[test]
    fn test_nxos_save_command() {
        let platform = nxos();
        assert_eq!(platform.save_command, "copy running-config startup-config");
        assert!(platform.detect_failure("% Invalid command at '^' marker.").is_some());
    }

    #[test]
    fn test_reserved_vlan_rename_is_a_failure() {
        let platform = ios();
        let output = "%Default VLAN 1 may not have its name changed.";
        assert!(platform.detect_failure(output).is_some());
    }
}
