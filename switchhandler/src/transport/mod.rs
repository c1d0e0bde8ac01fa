//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, host key policy and shell channel
//! creation. Everything above this layer only sees a PTY channel.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
