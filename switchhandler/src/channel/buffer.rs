//! Output buffer with tail-only prompt search.
//!
//! Prompts only ever appear at the end of what the device has sent so far,
//! so only the last `search_depth` bytes are scanned. This keeps prompt
//! detection cheap on long outputs such as `show running-config`.
//! Command echoes sit at the start of a reply, so they get a full search.

use regex::bytes::Regex;

/// Accumulates channel output (ANSI escapes removed) until a prompt shows up.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end are searched for a prompt.
    search_depth: usize,
}

impl PatternBuffer {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append data received from the device, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search the tail of the buffer for `pattern`.
    ///
    /// Returns the end offset of the match relative to the whole buffer.
    pub fn find_in_tail(&self, pattern: &Regex) -> Option<usize> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern
            .find(&self.buffer[start..])
            .map(|m| start + m.end())
    }

    /// Search the whole buffer for `pattern`, returning the end offset of
    /// the first match.
    pub fn find_anywhere(&self, pattern: &Regex) -> Option<usize> {
        pattern.find(&self.buffer).map(|m| m.end())
    }

    /// Remove and return everything up to `end`, keeping the remainder.
    pub fn split_to(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.buffer.len());
        let rest = self.buffer.split_off(end);
        std::mem::replace(&mut self.buffer, rest)
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mswitch1#\x1b[0m");
        assert_eq!(buffer.split_to(usize::MAX), b"switch1#");
    }

    #[test]
    fn test_tail_search_offset_is_absolute() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nswitch1#");

        let pattern = Regex::new(r"switch1#").unwrap();
        assert_eq!(buffer.find_in_tail(&pattern), Some(109));
    }

    #[test]
    fn test_prompt_outside_tail_is_ignored() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"switch1#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"switch1#").unwrap();
        assert!(buffer.find_in_tail(&pattern).is_none());
    }

    #[test]
    fn test_echo_found_when_reply_arrives_in_one_large_chunk() {
        let mut reply = String::from("show vlan\r\n");
        reply.push_str("\r\nVLAN Name                             Status    Ports\r\n");
        for id in 2..50 {
            reply.push_str(&format!(
                "{id:<4} VLAN{id:04}                         active    Gi1/0/{id}\r\n"
            ));
        }
        reply.push_str("sw1#");

        let mut buffer = PatternBuffer::default();
        buffer.extend(reply.as_bytes());

        let echo = Regex::new(&regex::escape("show vlan")).unwrap();
        assert!(buffer.find_in_tail(&echo).is_none());
        assert_eq!(buffer.find_anywhere(&echo), Some("show vlan".len()));

        let head = buffer.split_to("show vlan".len());
        assert_eq!(head, b"show vlan");
        let prompt = Regex::new(r"sw1#").unwrap();
        assert!(buffer.find_in_tail(&prompt).is_some());
    }

    #[test]
    fn test_split_keeps_remainder() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"output\nswitch1#trailing");
        let head = buffer.split_to(15);
        assert_eq!(head, b"output\nswitch1#");
        assert_eq!(buffer.split_to(usize::MAX), b"trailing");
    }
}
