//! # switchhandler
//!
//! Async object model for managed network switches.
//!
//! A [`Switch`] owns one SSH session to a device and exposes what the device
//! reports as plain Rust values: facts from `show version`, a table of
//! [`Vlan`]s from `show vlan`, and on request the [`Interface`]s. Changing a
//! VLAN name, a port description or an access VLAN sends the matching
//! configuration to the device and updates the cached value once the device
//! has accepted it.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, with device-type autodetection
//!   (Cisco IOS, IOS-XE, NX-OS, Arista EOS)
//! - Prompt-driven PTY reads with tail-only pattern search
//! - TextFSM parsing of `show` output into records
//! - Write-through setters with validation before anything is sent
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use switchhandler::{Credentials, Switch, VlanRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), switchhandler::Error> {
//!     let credentials = Credentials::new("admin", "secret").with_enable_secret("enable");
//!     let mut switch = Switch::connect("192.0.2.10", credentials).await?;
//!
//!     for vlan in switch.vlans().values() {
//!         println!("{vlan}");
//!     }
//!
//!     switch.load_interfaces().await?;
//!     switch
//!         .set_interface_access_vlan("Gi1/0/4", Some(VlanRef::from(10)))
//!         .await?;
//!
//!     switch.close().await;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod connection;
pub mod error;
pub mod model;
pub mod parse;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use connection::{Connection, ConnectionBuilder, Credentials, SshConnection};
pub use error::Error;
pub use model::{Interface, Switch, SwitchFacts, UnknownKeys, Uptime, Vlan, VlanId, VlanRef};
pub use platform::DeviceType;
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
