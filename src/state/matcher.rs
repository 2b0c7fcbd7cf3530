//! Matching typed input against lanes.

use super::lane::Lane;

/// The text the player is currently typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Remove the last character, if any.
    pub fn backspace(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Take the text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Resolves typed tokens against lanes.
///
/// Unmatched tokens are free: the matcher never produces a penalty.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    reward: i64,
}

impl Matcher {
    pub fn new(reward: i64) -> Self {
        Self { reward }
    }

    /// Score awarded per match.
    pub fn reward(&self) -> i64 {
        self.reward
    }

    /// Trim surrounding whitespace and lower-case, the form vocabulary words
    /// are stored in.
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Remove the first occurrence of `token` from the first lane (in scan
    /// order) that holds it. Returns that lane's index.
    ///
    /// `token` must already be normalized.
    pub fn remove_match(&self, lanes: &mut [Lane], token: &str) -> Option<usize> {
        lanes.iter_mut().position(|lane| lane.remove_first(token))
    }
}
