//! Built-in platform definitions.

pub mod arista;
pub mod cisco;

use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Generic IOS-style prompt: `host>`, `host#`, `host(config...)#`.
///
/// Adapted from scrapli's IOS-XE/EOS prompt patterns.
pub(crate) static IOS_STYLE_PROMPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[\w.\-@/:]{1,63}(?:\([\w.\-@/:+]{0,63}\))?[>#]\s?$")
        .expect("static prompt pattern")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_style_prompt() {
        assert!(IOS_STYLE_PROMPT.is_match(b"switch>"));
        assert!(IOS_STYLE_PROMPT.is_match(b"switch#"));
        assert!(IOS_STYLE_PROMPT.is_match(b"access-sw-01.lab#"));
        assert!(IOS_STYLE_PROMPT.is_match(b"banner\r\nswitch(config)#"));
        assert!(IOS_STYLE_PROMPT.is_match(b"switch(config-if)# "));

        assert!(!IOS_STYLE_PROMPT.is_match(b"Password:"));
        assert!(!IOS_STYLE_PROMPT.is_match(b"switch$ "));
    }
}
