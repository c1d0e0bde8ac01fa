//! Builder for opening device sessions.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::ssh::SshConnection;
use crate::error::{Result, TransportError};
use crate::platform::DeviceType;
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig};

/// Username, password and optional enable secret for a switch.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub enable_secret: Option<SecretString>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            enable_secret: None,
        }
    }

    /// Secret sent to `enable` when the session lands in user exec mode.
    pub fn with_enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }
}

/// Builder for [`SshConnection`].
///
/// Leaving the device type unset runs autodetection after login.
///
/// # Example
///
/// ```rust,no_run
/// use switchhandler::ConnectionBuilder;
///
/// # async fn example() -> Result<(), switchhandler::Error> {
/// let connection = ConnectionBuilder::new("192.0.2.10")
///     .username("admin")
///     .password("secret")
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    enable_secret: Option<SecretString>,
    device_type: Option<DeviceType>,
    timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

/// Validated builder contents, ready to open a session.
pub(crate) struct ConnectionSettings {
    pub ssh: SshConfig,
    pub device_type: Option<DeviceType>,
    pub enable_secret: Option<SecretString>,
}

impl ConnectionBuilder {
    /// Create a new builder for the given management address.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            enable_secret: None,
            device_type: None,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Use password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Use private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Use private key authentication with an encrypted key.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    pub fn enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Username, password and enable secret in one go.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.username = Some(credentials.username);
        self.auth = AuthMethod::Password(credentials.password);
        self.enable_secret = credentials.enable_secret;
        self
    }

    /// Skip autodetection and use this device type.
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = Some(device_type);
        self
    }

    /// Timeout for connecting and for each command (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// The management address this builder connects to.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub(crate) fn into_settings(self) -> Result<ConnectionSettings> {
        let username = self.username.ok_or_else(|| TransportError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;

        if self.host.trim().is_empty() {
            return Err(TransportError::InvalidConfig {
                message: "Host is required".to_string(),
            }
            .into());
        }

        let ssh = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok(ConnectionSettings {
            ssh,
            device_type: self.device_type,
            enable_secret: self.enable_secret,
        })
    }

    /// Open the session: connect, authenticate, detect the device type if
    /// needed, and prepare the terminal.
    pub async fn connect(self) -> Result<SshConnection> {
        SshConnection::open(self.into_settings()?).await
    }
}
