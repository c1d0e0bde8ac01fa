//! [`Connection`] over an SSH shell channel.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::Connection;
use super::builder::ConnectionSettings;
use crate::channel::PtyChannel;
use crate::error::{ChannelError, CommandError, Result};
use crate::parse::{Record, parse_output};
use crate::platform::detect::DETECT_COMMAND;
use crate::platform::vendors::IOS_STYLE_PROMPT;
use crate::platform::{
    DeviceType, PlatformDefinition, base_prompt, detect_device_type, is_user_exec,
};
use crate::transport::SshTransport;

/// Prompt or password request after `enable`.
static ENABLE_PROMPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)(?:^[\w.\-@/:]{1,63}[>#]\s?$|password:\s*$)")
        .expect("static enable pattern")
});

struct Session {
    transport: SshTransport,
    channel: PtyChannel,
}

impl Session {
    async fn close(self) -> Result<()> {
        if let Err(e) = self.channel.close().await {
            debug!("channel close failed: {}", e);
        }
        self.transport.close().await
    }
}

/// Interactive SSH session to a switch, in privileged exec mode.
///
/// Created by [`ConnectionBuilder::connect`](super::ConnectionBuilder::connect).
pub struct SshConnection {
    host: String,
    device_type: DeviceType,
    platform: PlatformDefinition,

    /// Prompt pinned to this device's hostname.
    prompt_pattern: Regex,

    /// `None` once disconnected.
    session: Option<Session>,
}

impl SshConnection {
    pub(crate) async fn open(settings: ConnectionSettings) -> Result<Self> {
        let host = settings.ssh.host.clone();
        let timeout = settings.ssh.timeout;

        let transport = SshTransport::connect(settings.ssh).await?;
        let channel = match transport.open_shell().await {
            Ok(channel) => PtyChannel::new(channel, timeout),
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    debug!("{}: close after failed shell: {}", host, close_err);
                }
                return Err(e);
            }
        };

        let mut session = Session { transport, channel };
        let prepared = prepare(
            &host,
            &mut session.channel,
            settings.device_type,
            settings.enable_secret.as_ref(),
        )
        .await;

        match prepared {
            Ok((platform, prompt_pattern)) => {
                info!("{}: session ready ({})", host, platform.device_type);
                Ok(Self {
                    host,
                    device_type: platform.device_type,
                    platform,
                    prompt_pattern,
                    session: Some(session),
                })
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    debug!("{}: close after failed setup: {}", host, close_err);
                }
                Err(e)
            }
        }
    }

    /// Management address this session was opened to.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn channel(&mut self) -> Result<&mut PtyChannel> {
        self.session
            .as_mut()
            .map(|s| &mut s.channel)
            .ok_or_else(|| CommandError::NotConnected.into())
    }

    /// Send one line, wait for the prompt, and return normalized output.
    async fn run(&mut self, command: &str) -> Result<String> {
        let pattern = self.prompt_pattern.clone();
        let channel = self.channel()?;
        let raw = exchange_echoed(channel, command, &pattern).await?;
        Ok(self.platform.normalize_output(&raw, command))
    }

    /// [`run`](Self::run), failing if the output matches a failure pattern.
    async fn run_checked(&mut self, command: &str) -> Result<String> {
        let output = self.run(command).await?;
        match self.platform.detect_failure(&output) {
            Some(pattern) => Err(failure(command, &output, pattern)),
            None => Ok(output),
        }
    }
}

impl Connection for SshConnection {
    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        debug!("{}: send_command {:?}", self.host, command);
        self.run_checked(command).await
    }

    async fn send_command_structured(&mut self, command: &str) -> Result<Vec<Record>> {
        let output = self.send_command(command).await?;
        parse_output(self.device_type, command, &output)
    }

    async fn send_config_set(&mut self, commands: &[&str]) -> Result<String> {
        debug!("{}: send_config_set {:?}", self.host, commands);

        let enter = self.platform.config_enter.clone();
        let exit = self.platform.config_exit.clone();

        let mut output = self.run_checked(&enter).await?;
        for command in commands {
            match self.run_checked(command).await {
                Ok(line_output) => {
                    output.push('\n');
                    output.push_str(&line_output);
                }
                Err(e) => {
                    if let Err(exit_err) = self.run(&exit).await {
                        warn!("{}: could not leave config mode: {}", self.host, exit_err);
                    }
                    return Err(e);
                }
            }
        }

        output.push('\n');
        output.push_str(&self.run(&exit).await?);
        Ok(output)
    }

    async fn save_config(&mut self) -> Result<String> {
        let save = self.platform.save_command.clone();
        debug!("{}: {}", self.host, save);
        self.run_checked(&save).await
    }

    async fn find_prompt(&mut self) -> Result<String> {
        let pattern = self.prompt_pattern.clone();
        let channel = self.channel()?;
        let raw = exchange_echoed(channel, "", &pattern).await?;
        Ok(last_line(&raw).to_string())
    }

    async fn disconnect(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                info!("{}: disconnecting", self.host);
                session.close().await
            }
            None => Ok(()),
        }
    }
}

impl Drop for SshConnection {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!(
                "SshConnection to {} dropped without disconnect(); the session is torn down without a clean close",
                self.host
            );
        }
    }
}

/// Bring a fresh shell to privileged exec and work out its prompt.
async fn prepare(
    host: &str,
    channel: &mut PtyChannel,
    device_type: Option<DeviceType>,
    enable_secret: Option<&SecretString>,
) -> Result<(PlatformDefinition, Regex)> {
    let generic_prompt = match device_type {
        Some(t) => t.platform().prompt_pattern,
        None => IOS_STYLE_PROMPT.clone(),
    };

    channel.send_line("").await?;
    let banner = channel.read_until(&generic_prompt).await?;
    let mut prompt = last_line(&banner).to_string();
    debug!("{}: initial prompt {:?}", host, prompt);

    if is_user_exec(&prompt) {
        prompt = enable(host, channel, enable_secret, &generic_prompt, prompt).await?;
    }

    let device_type = match device_type {
        Some(device_type) => device_type,
        None => {
            exchange_echoed(channel, "terminal length 0", &generic_prompt).await?;
            let output = exchange_echoed(channel, DETECT_COMMAND, &generic_prompt).await?;
            let detected = detect_device_type(&output)?;
            info!("{}: detected device type {}", host, detected);
            detected
        }
    };

    let platform = device_type.platform();
    let prompt_pattern = platform.base_prompt_pattern(base_prompt(&prompt))?;

    for command in &platform.on_open_commands {
        let raw = exchange_echoed(channel, command, &prompt_pattern).await?;
        if let Some(pattern) = platform.detect_failure(&raw) {
            warn!("{}: '{}' rejected ({})", host, command, pattern);
        }
    }

    Ok((platform, prompt_pattern))
}

/// Raise user exec to privileged exec. Returns the new prompt.
async fn enable(
    host: &str,
    channel: &mut PtyChannel,
    secret: Option<&SecretString>,
    prompt_pattern: &Regex,
    prompt: String,
) -> Result<String> {
    let Some(secret) = secret else {
        warn!(
            "{}: logged in at user exec and no enable secret is configured",
            host
        );
        return Ok(prompt);
    };

    let output = exchange_echoed(channel, "enable", &ENABLE_PROMPT).await?;
    let output = if last_line(&output).to_ascii_lowercase().contains("password") {
        channel.send_secret_line(secret.expose_secret()).await?;
        channel.read_until(prompt_pattern).await?
    } else {
        output
    };

    let prompt = last_line(&output).to_string();
    if is_user_exec(&prompt) {
        return Err(CommandError::PrivilegeEscalationFailed {
            message: format!("still at '{}' after enable", prompt),
        }
        .into());
    }

    debug!("{}: privileged exec", host);
    Ok(prompt)
}

/// Send `command` and read through its echo, then up to `prompt`.
///
/// Anchoring on the echo skips anything left over from earlier reads, so a
/// stale prompt in the buffer cannot end this read early. The returned text
/// starts with the echo line.
async fn exchange_echoed(channel: &mut PtyChannel, command: &str, prompt: &Regex) -> Result<String> {
    channel.send_line(command).await?;

    let mut raw = String::new();
    if !command.is_empty() {
        let echo = Regex::new(&regex::escape(command)).map_err(ChannelError::InvalidPattern)?;
        let before = channel.read_through(&echo).await?;
        raw.push_str(before.rsplit('\n').next().unwrap_or_default());
    }
    raw.push_str(&channel.read_until(prompt).await?);
    Ok(raw)
}

fn failure(command: &str, output: &str, pattern: &str) -> crate::Error {
    let message = output
        .lines()
        .find(|line| line.contains(pattern))
        .unwrap_or(pattern)
        .trim()
        .to_string();

    CommandError::Failed {
        command: command.to_string(),
        message,
    }
    .into()
}

/// Last non-empty line, trimmed.
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}
