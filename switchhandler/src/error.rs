//! Error types for switchhandler.

use std::time::Duration;

use thiserror::Error;

/// Main error type for switchhandler operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// The device rejected or failed a command
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Device type / platform errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Structured output parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A value was rejected before anything was sent to the device
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The connection builder is missing required settings
    #[error("Invalid connection settings: {message}")]
    InvalidConfig { message: String },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key does not match the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel")]
    PtyOpenFailed,

    /// Failed to request shell
    #[error("Failed to request shell")]
    ShellRequestFailed,

    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors reported by the device for a command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The connection has already been closed
    #[error("Not connected")]
    NotConnected,

    /// Command output matched one of the platform's failure patterns
    #[error("Command '{command}' failed: {message}")]
    Failed { command: String, message: String },

    /// Could not reach privileged exec mode
    #[error("Failed to enter privileged mode: {message}")]
    PrivilegeEscalationFailed { message: String },
}

/// Device type errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Device type name is not one of the supported types
    #[error("Unknown device type: '{name}'")]
    UnknownDeviceType { name: String },

    /// Autodetection did not match any known signature
    #[error("Could not detect device type from 'show version' output")]
    DetectionFailed,
}

/// Structured parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No template is registered for the device type and command
    #[error("No template for '{command}' on {device_type}")]
    NoTemplate {
        device_type: String,
        command: String,
    },

    /// The template could not be compiled or run
    #[error("Template '{template}' failed: {message}")]
    Template { template: String, message: String },

    /// The command produced no records where at least one was expected
    #[error("'{command}' returned no records")]
    Empty { command: String },

    /// A required field was missing from a record
    #[error("{entity} record is missing field '{field}'")]
    MissingField { entity: String, field: String },

    /// A field value could not be converted
    #[error("{entity} record has invalid '{field}': '{value}'")]
    InvalidField {
        entity: String,
        field: String,
        value: String,
    },

    /// A record carried a field the entity does not know about
    #[error("{entity} record has unknown field '{field}'")]
    UnknownField { entity: String, field: String },
}

/// Domain validation errors, raised before any device interaction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// VLANs 1 and 1002-1005 cannot be renamed
    #[error("VLAN {0} is reserved and cannot be modified")]
    ReservedVlan(u16),

    /// VLAN ID outside 1-4094
    #[error("VLAN ID {0} is out of range (1-4094)")]
    VlanIdOutOfRange(u32),

    /// VLAN name rejected
    #[error("Invalid VLAN name: {reason}")]
    InvalidVlanName { reason: String },

    /// Interface description rejected
    #[error("Invalid description: {reason}")]
    InvalidDescription { reason: String },

    /// VLAN reference rejected
    #[error("Invalid VLAN reference: {reason}")]
    InvalidVlanRef { reason: String },

    /// No VLAN with this ID on the switch
    #[error("VLAN {0} does not exist on this switch")]
    UnknownVlan(u16),

    /// No interface with this name on the switch
    #[error("Interface '{0}' does not exist on this switch")]
    UnknownInterface(String),
}

/// Result type alias using switchhandler's Error.
pub type Result<T> = std::result::Result<T, Error>;
