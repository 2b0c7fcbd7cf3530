//! Game configuration.
//!
//! Every tunable of a tower session lives here. A config is validated once,
//! when a session is built from it; sessions never see malformed values.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lane capacity (words per lane before overflow).
pub const DEFAULT_CAPACITY: usize = 40;

/// Default spawn period per lane (1 second).
pub const DEFAULT_SPAWN_PERIOD_MS: u64 = 1000;

/// Default chance that a spawner tick produces a word.
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.3;

/// Default points for a matched word.
pub const DEFAULT_MATCH_REWARD: i64 = 100;

/// Default lanes, in scan order.
pub const DEFAULT_LANES: [&str; 3] = ["red", "green", "blue"];

/// Default vocabulary.
pub const DEFAULT_VOCABULARY: [&str; 10] = [
    "apple", "banana", "cherry", "date", "fig", "grape", "kiwi", "lemon", "mango", "pear",
];

/// Configuration errors, reported when a session is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one lane is required")]
    NoLanes,
    #[error("lane names must not be blank")]
    BlankLane,
    #[error("lane {0:?} is configured more than once")]
    DuplicateLane(String),
    #[error("lane capacity must be positive")]
    ZeroCapacity,
    #[error("spawn period must be positive")]
    ZeroPeriod,
    #[error("spawn probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("vocabulary must contain at least one word")]
    EmptyVocabulary,
    #[error("vocabulary words must not be blank")]
    BlankWord,
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tower configuration.
///
/// Deserializes from partial JSON; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Lane ids in scan order
    pub lanes: Vec<String>,

    /// Maximum simultaneous words per lane
    pub capacity: usize,

    /// Milliseconds between spawner ticks
    pub spawn_period_ms: u64,

    /// Bernoulli probability of a word per tick
    pub spawn_probability: f64,

    /// Words the spawners draw from
    pub vocabulary: Vec<String>,

    /// Score added per matched word
    pub match_reward: i64,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES.iter().map(|s| s.to_string()).collect(),
            capacity: DEFAULT_CAPACITY,
            spawn_period_ms: DEFAULT_SPAWN_PERIOD_MS,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            vocabulary: DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            match_reward: DEFAULT_MATCH_REWARD,
        }
    }
}

impl TowerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON, filling gaps with defaults, and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn with_lanes<I, S>(mut self, lanes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lanes = lanes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the spawn period. Periods are kept in whole milliseconds; any
    /// fraction rounds up, so only a zero duration yields a zero period.
    pub fn with_spawn_period(mut self, period: Duration) -> Self {
        let millis = period.as_nanos().div_ceil(1_000_000);
        self.spawn_period_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn with_spawn_probability(mut self, probability: f64) -> Self {
        self.spawn_probability = probability;
        self
    }

    pub fn with_vocabulary<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_match_reward(mut self, reward: i64) -> Self {
        self.match_reward = reward;
        self
    }

    pub fn spawn_period(&self) -> Duration {
        Duration::from_millis(self.spawn_period_ms)
    }

    /// Check every field without modifying anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lanes.is_empty() {
            return Err(ConfigError::NoLanes);
        }

        let mut seen = HashSet::new();
        for lane in &self.lanes {
            if lane.trim().is_empty() {
                return Err(ConfigError::BlankLane);
            }
            if !seen.insert(lane.as_str()) {
                return Err(ConfigError::DuplicateLane(lane.clone()));
            }
        }

        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if self.spawn_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }

        // Also rejects NaN.
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::InvalidProbability(self.spawn_probability));
        }

        if self.vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        if self.vocabulary.iter().any(|w| w.trim().is_empty()) {
            return Err(ConfigError::BlankWord);
        }

        Ok(())
    }

    /// Validate, then bring the vocabulary into the form typed input is
    /// compared against (trimmed, lower case).
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.validate()?;
        for word in &mut self.vocabulary {
            *word = word.trim().to_lowercase();
        }
        Ok(self)
    }
}
