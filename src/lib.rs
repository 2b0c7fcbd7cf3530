//! Word Tower State Library
//!
//! This crate provides state management for the Word Tower typing game.
//!
//! # Overview
//!
//! Words fall into several lanes, each fed by its own timer. The player types
//! words to clear them. The game ends the moment any lane holds more words
//! than its capacity.
//!
//! - **Lanes** - Bounded FIFO queues of words with an overflow flag.
//!
//! - **Spawners** - One per lane, each on its own period and phase, adding a
//!   random vocabulary word with a fixed probability per tick.
//!
//! - **Matcher** - Resolves a typed token against the lanes in a fixed order
//!   and scores the first hit. Misses are free.
//!
//! - **Game Session** - Owns everything above and the
//!   `NotStarted → Running → GameOver` state machine.
//!
//! # Design Principles
//!
//! 1. **One serialization point** - Every mutation goes through the session,
//!    whether it comes from a timer or a keystroke.
//!
//! 2. **Deterministic by injection** - Randomness comes through a trait and
//!    time through a virtual clock, so whole games replay exactly in tests.
//!
//! 3. **Stale timers are harmless** - Ticks carry the generation they were
//!    armed for; ticks from a superseded or finished game are ignored.
//!
//! 4. **Serialization-ready** - Snapshots and events convert to JSON for UIs.
//!
//! # Example
//!
//! ```rust
//! use wordtower_state::{GameSession, ScriptedRandom, SessionStatus, TowerConfig};
//!
//! let config = TowerConfig::default().with_lanes(["red"]).with_capacity(2);
//! let random = ScriptedRandom::new().with_chances([true, true, true]);
//! let mut session = GameSession::with_random(config, random).unwrap();
//!
//! session.start();
//! session.advance(std::time::Duration::from_secs(3));
//!
//! assert_eq!(session.status(), SessionStatus::GameOver);
//! assert_eq!(session.overflowed_lane(), Some("red"));
//! ```
//!
//! For real-time play, [`driver::TowerHandle`] runs a session on tokio with
//! one timer task per lane.

pub mod driver;
pub mod state;

// Re-export everything from state module at crate root
pub use driver::{DriverError, TowerHandle};
pub use state::*;
