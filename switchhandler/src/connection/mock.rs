//! Scripted [`Connection`] for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::Connection;
use crate::error::{CommandError, Result};
use crate::parse::Record;
use crate::platform::DeviceType;

/// One call made against the mock, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Command(String),
    Structured(String),
    Config(Vec<String>),
    Save,
    Prompt,
    Disconnect,
}

/// Serves canned output and records every call.
pub struct MockConnection {
    device_type: DeviceType,
    prompt: String,
    outputs: HashMap<String, String>,
    structured: HashMap<String, Vec<Record>>,
    fail_config: Option<String>,
    fail_save: Option<String>,
    fail_disconnect: bool,
    fail_structured: Option<(String, usize)>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            device_type: DeviceType::CiscoIos,
            prompt: "sw1#".to_string(),
            outputs: HashMap::new(),
            structured: HashMap::new(),
            fail_config: None,
            fail_save: None,
            fail_disconnect: false,
            fail_structured: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_output(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }

    pub fn with_records(mut self, command: &str, records: Vec<Record>) -> Self {
        self.structured.insert(command.to_string(), records);
        self
    }

    /// Make every `send_config_set` fail with `message`.
    pub fn fail_config(mut self, message: &str) -> Self {
        self.fail_config = Some(message.to_string());
        self
    }

    /// Make every `save_config` fail with `message`.
    pub fn fail_save(mut self, message: &str) -> Self {
        self.fail_save = Some(message.to_string());
        self
    }

    pub fn fail_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// Let `command` succeed `successes` times through
    /// `send_command_structured`, then fail.
    pub fn fail_structured_after(mut self, command: &str, successes: usize) -> Self {
        self.fail_structured = Some((command.to_string(), successes));
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Shared handle on the call log, still readable after the mock has
    /// been moved into a `Switch`.
    pub fn call_log(&self) -> Arc<Mutex<Vec<Call>>> {
        self.calls.clone()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Build a record from `(key, value)` pairs.
pub fn record(fields: &[(&str, &str)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Connection for MockConnection {
    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        self.record_call(Call::Command(command.to_string()));
        Ok(self.outputs.get(command).cloned().unwrap_or_default())
    }

    async fn send_command_structured(&mut self, command: &str) -> Result<Vec<Record>> {
        self.record_call(Call::Structured(command.to_string()));
        if let Some((failing, successes)) = &mut self.fail_structured {
            if failing.as_str() == command {
                if *successes == 0 {
                    return Err(CommandError::Failed {
                        command: command.to_string(),
                        message: "% Timed out".to_string(),
                    }
                    .into());
                }
                *successes -= 1;
            }
        }
        Ok(self.structured.get(command).cloned().unwrap_or_default())
    }

    async fn send_config_set(&mut self, commands: &[&str]) -> Result<String> {
        self.record_call(Call::Config(
            commands.iter().map(|c| c.to_string()).collect(),
        ));
        match &self.fail_config {
            Some(message) => Err(CommandError::Failed {
                command: commands.join("; "),
                message: message.clone(),
            }
            .into()),
            None => Ok(String::new()),
        }
    }

    async fn save_config(&mut self) -> Result<String> {
        self.record_call(Call::Save);
        match &self.fail_save {
            Some(message) => Err(CommandError::Failed {
                command: "write memory".to_string(),
                message: message.clone(),
            }
            .into()),
            None => Ok("Building configuration...\n[OK]".to_string()),
        }
    }

    async fn find_prompt(&mut self) -> Result<String> {
        self.record_call(Call::Prompt);
        Ok(self.prompt.clone())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.record_call(Call::Disconnect);
        if self.fail_disconnect {
            return Err(CommandError::NotConnected.into());
        }
        Ok(())
    }
}
