//! Arista EOS platform definition.
//!
//! Prompt patterns adapted from [scrapli](https://github.com/carlmontanari/scrapli).

use super::IOS_STYLE_PROMPT;
use crate::platform::{DeviceType, PlatformDefinition};

/// Create the Arista EOS platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new(DeviceType::AristaEos, IOS_STYLE_PROMPT.clone())
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Error")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Unavailable command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 32767")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arista_platform() {
        let platform = platform();
        assert_eq!(platform.device_type, DeviceType::AristaEos);
        assert_eq!(platform.save_command, "write memory");
        assert!(
            platform
                .failed_when_contains
                .contains(&"% Invalid input".to_string())
        );
        assert!(
            platform
                .on_open_commands
                .contains(&"terminal width 32767".to_string())
        );
    }
}
