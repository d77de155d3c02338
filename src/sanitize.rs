use std::collections::BTreeSet;

use regex::Regex;

const DEFAULT_ALLOWED: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_-[]()/.\\";

#[derive(Debug, Clone)]
pub struct NameSanitizer {
    allowed: BTreeSet<char>,
    whitespace: Regex,
}

impl NameSanitizer {
    pub fn new() -> Self {
        Self::with_extra_allowed("")
    }

    pub fn with_extra_allowed(extra: &str) -> Self {
        let allowed = DEFAULT_ALLOWED.chars().chain(extra.chars()).collect();
        Self {
            allowed,
            whitespace: Regex::new(r"[\s\x1C-\x1F]+").expect("static whitespace pattern"),
        }
    }

    pub fn is_allowed(&self, ch: char) -> bool {
        self.allowed.contains(&ch)
    }

    pub fn sanitize(&self, name: &str) -> String {
        let kept: String = name
            .trim_matches(is_space)
            .chars()
            .filter(|ch| self.allowed.contains(ch) || is_space(*ch))
            .collect();
        self.whitespace
            .replace_all(kept.trim_matches(is_space), "_")
            .into_owned()
    }
}

// Unicode whitespace plus the ASCII separators U+001C..U+001F.
fn is_space(ch: char) -> bool {
    ch.is_whitespace() || ('\x1C'..='\x1F').contains(&ch)
}

impl Default for NameSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
