//! PTY shell channel with prompt-driven reads.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

#[derive(Debug, Clone, Copy)]
enum Search {
    Tail,
    Anywhere,
}

/// Interactive shell channel on a managed device.
///
/// Every exchange is "write a line, read until the prompt comes back".
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    timeout: Duration,
}

impl PtyChannel {
    pub fn new(channel: Channel<Msg>, timeout: Duration) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::default(),
            timeout,
        }
    }

    /// Write one line (a newline is appended).
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        trace!("send: {:?}", line);
        let data = format!("{line}\n");
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Write one line without echoing it into the trace log.
    pub async fn send_secret_line(&mut self, line: &str) -> Result<()> {
        trace!("send: <hidden>");
        let data = format!("{line}\n");
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the received output.
    ///
    /// Returns everything up to and including the match. Output received
    /// after the match stays buffered for the next read.
    pub async fn read_until(&mut self, pattern: &Regex) -> Result<String> {
        self.read_matching(pattern, Search::Tail).await
    }

    /// Like [`read_until`](Self::read_until), but `pattern` may match
    /// anywhere in the buffered output. Used for command echoes, which can
    /// arrive in the same chunk as a long reply.
    pub async fn read_through(&mut self, pattern: &Regex) -> Result<String> {
        self.read_matching(pattern, Search::Anywhere).await
    }

    async fn read_matching(&mut self, pattern: &Regex, search: Search) -> Result<String> {
        let timeout = self.timeout;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let found = match search {
                Search::Tail => self.buffer.find_in_tail(pattern),
                Search::Anywhere => self.buffer.find_anywhere(pattern),
            };
            if let Some(end) = found {
                let data = self.buffer.split_to(end);
                let text = String::from_utf8_lossy(&data).replace("\r\n", "\n");
                trace!("recv: {:?}", text);
                return Ok(text);
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Signal end of input and close the channel.
    pub async fn close(self) -> Result<()> {
        // Devices frequently tear the channel down first; eof is best effort.
        let _ = self.channel.eof().await;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
