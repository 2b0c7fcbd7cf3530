//! State management module for Word Tower.
//!
//! This module provides the core state types:
//!
//! - `config` - Tunables, defaults and validation
//! - `lane` - Bounded FIFO lanes of words
//! - `random` - Injectable random sources for spawning
//! - `spawner` - Per-lane spawn timers on a virtual clock
//! - `matcher` - Typed input and lane matching
//! - `session` - The game session state machine
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          GameSession                              │
//! │                                                                   │
//! │  ┌───────────┐   SpawnTick   ┌─────────────────────────────────┐  │
//! │  │ Spawner 0 │──────────────▶│ Lane "red"    [apple, fig, ...] │  │
//! │  ├───────────┤               ├─────────────────────────────────┤  │
//! │  │ Spawner 1 │──────────────▶│ Lane "green"  [kiwi, ...]       │  │
//! │  ├───────────┤               ├─────────────────────────────────┤  │
//! │  │ Spawner 2 │──────────────▶│ Lane "blue"   [...]             │  │
//! │  └───────────┘               └─────────────────────────────────┘  │
//! │                                        ▲ scan in lane order       │
//! │  ┌─────────────┐   submit   ┌──────────┴──┐                       │
//! │  │ InputBuffer │───────────▶│   Matcher   │──▶ score              │
//! │  └─────────────┘            └─────────────┘                       │
//! │                                                                   │
//! │  status: NotStarted → Running → GameOver (first lane overflow)    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use wordtower_state::state::{GameSession, SessionStatus, SubmitOutcome, TowerConfig};
//!
//! let mut session = GameSession::new(TowerConfig::default()).unwrap();
//! session.start();
//!
//! session.spawn_word("red", "apple").unwrap();
//! assert!(matches!(session.submit(" Apple "), SubmitOutcome::Matched { .. }));
//! assert_eq!(session.score(), 100);
//!
//! // Let the spawners run for a few virtual seconds
//! session.advance(Duration::from_secs(3));
//! assert_eq!(session.status(), SessionStatus::Running);
//! ```

pub mod config;
pub mod lane;
pub mod matcher;
pub mod random;
pub mod session;
pub mod spawner;

// Re-export commonly used types
pub use config::{
    ConfigError, TowerConfig, DEFAULT_CAPACITY, DEFAULT_LANES, DEFAULT_MATCH_REWARD,
    DEFAULT_SPAWN_PERIOD_MS, DEFAULT_SPAWN_PROBABILITY, DEFAULT_VOCABULARY,
};
pub use lane::Lane;
pub use matcher::{InputBuffer, Matcher};
pub use random::{ScriptedRandom, SpawnRandom};
pub use session::{
    GameError, GameSession, LaneView, SessionEvent, SessionStats, SessionStatus, Snapshot,
    SubmitOutcome,
};
pub use spawner::{SpawnSchedule, SpawnTick, Spawner, TickOutcome};
