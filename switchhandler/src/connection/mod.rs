//! The device session capability the domain model is written against.
//!
//! Entities never talk SSH themselves. Every read and write goes through a
//! [`Connection`], which the [`Switch`](crate::model::Switch) owns and lends
//! out by `&mut` for the duration of a single operation. The borrow checker
//! therefore guarantees that only one logical caller uses the session at a
//! time.

mod builder;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;

use std::future::Future;

pub use builder::{ConnectionBuilder, Credentials};
pub use ssh::SshConnection;

use crate::error::Result;
use crate::parse::Record;
use crate::platform::DeviceType;

/// An authenticated, interactive session to one network device.
pub trait Connection: Send {
    /// Command dialect of the device, fixed once the session is open.
    fn device_type(&self) -> DeviceType;

    /// Run a command in privileged exec mode and return its output, with the
    /// command echo and trailing prompt removed.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// Run a command and parse its output into records.
    fn send_command_structured(
        &mut self,
        command: &str,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Enter configuration mode, send every line, and return to privileged
    /// exec mode.
    ///
    /// Fails if the device rejects any line. Configuration mode is left
    /// before the error is returned.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use switchhandler::Connection;
    ///
    /// # async fn example(conn: &mut impl Connection) -> Result<(), switchhandler::Error> {
    /// conn.send_config_set(&["interface GigabitEthernet1/0/1", "no shutdown"])
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    fn send_config_set(&mut self, commands: &[&str])
    -> impl Future<Output = Result<String>> + Send;

    /// Copy the running configuration to the startup configuration.
    fn save_config(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// The device prompt as currently displayed (e.g. `sw1#`).
    fn find_prompt(&mut self) -> impl Future<Output = Result<String>> + Send;

    /// Close the session. Further calls fail with `CommandError::NotConnected`.
    fn disconnect(&mut self) -> impl Future<Output = Result<()>> + Send;
}
