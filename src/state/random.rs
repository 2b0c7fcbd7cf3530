//! Random sources for spawning.
//!
//! Sessions draw every random decision through [`SpawnRandom`], so a scripted
//! source can replace the real generator and make spawn sequences exact.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;

/// The random decisions a session makes.
pub trait SpawnRandom {
    /// Bernoulli draw: `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Delay before a spawner's first tick, in `1..=period_ms`.
    fn phase(&mut self, period_ms: u64) -> u64;
}

impl SpawnRandom for StdRng {
    fn chance(&mut self, probability: f64) -> bool {
        self.gen_bool(probability)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn phase(&mut self, period_ms: u64) -> u64 {
        self.gen_range(1..=period_ms)
    }
}

/// A pre-recorded sequence of random decisions.
///
/// Once a queue runs dry the source falls back to: no spawn, index 0, and a
/// phase of one full period (all lanes in lockstep).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    chances: VecDeque<bool>,
    picks: VecDeque<usize>,
    phases: VecDeque<u64>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue Bernoulli outcomes.
    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Queue vocabulary indices.
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Queue first-tick delays, consumed in lane order at each start.
    pub fn with_phases(mut self, phases: impl IntoIterator<Item = u64>) -> Self {
        self.phases.extend(phases);
        self
    }

    /// Queue one successful spawn of the word at `index`.
    pub fn spawn(mut self, index: usize) -> Self {
        self.chances.push_back(true);
        self.picks.push_back(index);
        self
    }

    /// Queue one tick that spawns nothing.
    pub fn idle(mut self) -> Self {
        self.chances.push_back(false);
        self
    }
}

impl SpawnRandom for ScriptedRandom {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }

    fn phase(&mut self, period_ms: u64) -> u64 {
        self.phases
            .pop_front()
            .unwrap_or(period_ms)
            .clamp(1, period_ms)
    }
}
