//! Lane state.
//!
//! A lane is a bounded FIFO of words fed by its own spawner. Going over
//! capacity is not an error at this level: the lane only raises a flag and
//! the session decides what it means.

use std::collections::VecDeque;

/// A single lane of falling words.
#[derive(Debug, Clone)]
pub struct Lane {
    /// Lane identity (e.g. a color)
    id: String,

    /// Pending words, oldest first
    words: VecDeque<String>,

    /// Maximum simultaneous words
    capacity: usize,

    /// Set by the enqueue that took the lane over capacity
    overflowed: bool,
}

impl Lane {
    /// Create an empty lane.
    pub fn new(id: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            words: VecDeque::new(),
            capacity,
            overflowed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check if an enqueue has taken this lane over capacity.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Append a word at the tail, returning the new size.
    ///
    /// Flags the lane as overflowed if the new size exceeds capacity. The
    /// flag stays set until [`Lane::clear`].
    pub fn enqueue(&mut self, word: impl Into<String>) -> usize {
        self.words.push_back(word.into());
        let size = self.words.len();
        if size > self.capacity {
            self.overflowed = true;
        }
        size
    }

    /// Remove the earliest entry equal to `word`.
    ///
    /// Comparison is exact; callers normalize case and whitespace.
    pub fn remove_first(&mut self, word: &str) -> bool {
        match self.words.iter().position(|w| w == word) {
            Some(index) => {
                self.words.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Words from head (oldest) to tail (newest).
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Empty the lane and clear the overflow flag.
    pub fn clear(&mut self) {
        self.words.clear();
        self.overflowed = false;
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "words": self.words().collect::<Vec<_>>(),
            "capacity": self.capacity,
            "overflowed": self.overflowed
        })
    }
}
