//! Per-lane spawn timers.
//!
//! Each lane has one spawner running on its own period and phase. A spawner
//! never touches its lane directly: firing yields a [`SpawnTick`] which the
//! session applies. Ticks carry the session generation they were armed for,
//! so a tick that outlives its session is recognisably stale.

use std::time::Duration;

use super::random::SpawnRandom;

/// One firing of a lane's spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTick {
    /// Index of the lane in scan order
    pub lane: usize,

    /// Session generation the spawner was armed for
    pub generation: u64,
}

/// What applying a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale tick, or the session is not running
    Ignored,
    /// The Bernoulli draw failed; nothing spawned
    Idle,
    /// A word was added to the lane
    Spawned {
        lane: String,
        word: String,
        size: usize,
    },
    /// A word was added and took the lane over capacity
    Overflowed { lane: String, word: String },
}

impl TickOutcome {
    /// The spawned word, if any.
    pub fn word(&self) -> Option<&str> {
        match self {
            Self::Spawned { word, .. } | Self::Overflowed { word, .. } => Some(word),
            _ => None,
        }
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflowed { .. })
    }
}

/// Timing of an armed spawner, for driving it from a real timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSchedule {
    pub tick: SpawnTick,
    pub first_delay: Duration,
    pub period: Duration,
}

/// A lane's spawn timer on the session's virtual clock.
#[derive(Debug, Clone)]
pub struct Spawner {
    lane: usize,
    period_ms: u64,
    generation: u64,
    /// Virtual time of the next tick; `None` while disarmed
    next_due: Option<u64>,
}

impl Spawner {
    /// Create a disarmed spawner.
    pub fn new(lane: usize, period_ms: u64) -> Self {
        Self {
            lane,
            period_ms,
            generation: 0,
            next_due: None,
        }
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.next_due
    }

    /// Arm for a session generation, first tick after a random phase.
    pub fn arm(&mut self, now_ms: u64, generation: u64, random: &mut impl SpawnRandom) {
        let phase = random.phase(self.period_ms);
        self.generation = generation;
        self.next_due = Some(now_ms.saturating_add(phase));
    }

    /// Disarm. Returns whether the spawner was armed.
    pub fn cancel(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// Fire if due at or before `now_ms`, scheduling the next tick one
    /// period later. A spawner whose next tick would fall past the end of the
    /// clock disarms itself.
    pub fn fire_if_due(&mut self, now_ms: u64) -> Option<SpawnTick> {
        let due = self.next_due?;
        if due > now_ms {
            return None;
        }
        self.next_due = due.checked_add(self.period_ms);
        Some(SpawnTick {
            lane: self.lane,
            generation: self.generation,
        })
    }

    /// The real-time equivalent of this spawner's schedule.
    pub fn schedule(&self, now_ms: u64) -> Option<SpawnSchedule> {
        let due = self.next_due?;
        Some(SpawnSchedule {
            tick: SpawnTick {
                lane: self.lane,
                generation: self.generation,
            },
            first_delay: Duration::from_millis(due.saturating_sub(now_ms)),
            period: Duration::from_millis(self.period_ms),
        })
    }
}

/// Decide what one tick spawns: a Bernoulli draw, then a uniform word pick.
pub fn draw_word<'a>(
    random: &mut impl SpawnRandom,
    probability: f64,
    vocabulary: &'a [String],
) -> Option<&'a str> {
    if vocabulary.is_empty() || !random.chance(probability) {
        return None;
    }
    vocabulary
        .get(random.pick(vocabulary.len()))
        .map(String::as_str)
}
