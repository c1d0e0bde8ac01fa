//! Per-device-type session behaviour.

use regex::bytes::Regex;

use super::DeviceType;
use crate::error::{ChannelError, Result};

/// Everything the SSH backend needs to know about a device type's CLI.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    pub device_type: DeviceType,

    /// Matches any prompt of this platform before the hostname is known.
    pub prompt_pattern: Regex,

    /// Command that enters global configuration mode.
    pub config_enter: String,

    /// Command that leaves configuration mode back to privileged exec.
    pub config_exit: String,

    /// Command that copies running-config to startup-config.
    pub save_command: String,

    /// Output substrings that mean the device rejected a command.
    pub failed_when_contains: Vec<String>,

    /// Commands run once after the session is established.
    pub on_open_commands: Vec<String>,
}

impl PlatformDefinition {
    pub fn new(device_type: DeviceType, prompt_pattern: Regex) -> Self {
        Self {
            device_type,
            prompt_pattern,
            config_enter: "configure terminal".to_string(),
            config_exit: "end".to_string(),
            save_command: "write memory".to_string(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
        }
    }

    pub fn with_save_command(mut self, command: impl Into<String>) -> Self {
        self.save_command = command.into();
        self
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// First failure pattern found in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Prompt pattern pinned to one hostname.
    ///
    /// Matches `host>`, `host#` and every `host(config...)#` sub-mode, and
    /// nothing else, so command output cannot end a read early. IOS cuts
    /// long hostnames short in configuration prompts, so sub-mode prompts
    /// only need to start with the first [`CONFIG_PROMPT_PREFIX`]
    /// characters of the hostname.
    pub fn base_prompt_pattern(&self, base_prompt: &str) -> Result<Regex> {
        let prefix = match base_prompt.char_indices().nth(CONFIG_PROMPT_PREFIX) {
            Some((end, _)) => &base_prompt[..end],
            None => base_prompt,
        };
        let pattern = format!(
            r"(?m)^(?:{}|{}[^\s(#>]*\([\w.\-@/:+]{{0,63}}\))[>#]\s?$",
            regex::escape(base_prompt),
            regex::escape(prefix),
        );
        Regex::new(&pattern).map_err(|e| ChannelError::InvalidPattern(e).into())
    }

    /// Strip echo of `command` and the trailing prompt line from raw output.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let output = raw.trim_start_matches(['\r', '\n']);
        let output = match output.split_once('\n') {
            Some((first, rest)) if first.trim_end().ends_with(command.trim()) => rest,
            None if output.trim_end().ends_with(command.trim()) => "",
            _ => output,
        };

        match output.rfind('\n') {
            Some(pos) => output[..pos].trim_end_matches('\r').to_string(),
            None => String::new(),
        }
    }
}

/// Hostname characters guaranteed to survive in a configuration prompt.
pub const CONFIG_PROMPT_PREFIX: usize = 16;

/// Hostname part of a prompt: `sw1(config-if)#` -> `sw1`.
pub fn base_prompt(prompt: &str) -> &str {
    let prompt = prompt.trim().trim_end_matches(['#', '>']);
    match prompt.find('(') {
        Some(pos) if prompt.ends_with(')') => &prompt[..pos],
        _ => prompt,
    }
}

/// Whether a prompt is user exec (`>`), where configuration is unavailable.
pub fn is_user_exec(prompt: &str) -> bool {
    prompt.trim_end().ends_with('>')
}
