//! Game session state.
//!
//! The session owns every lane, the score and the status, and is the only
//! place any of them change. Spawner ticks (from the virtual clock or from
//! real timers) and player submissions all funnel through `&mut self`, which
//! gives every mutation a single total order.
//!
//! # State Diagram
//!
//! ```text
//! ┌────────────┐  start   ┌─────────┐  lane overflow  ┌──────────┐
//! │ NotStarted │─────────▶│ Running │────────────────▶│ GameOver │
//! └────────────┘          └─────────┘                 └──────────┘
//!                           ▲     │ start                   │
//!                           └─────┘◀────────────────────────┘
//!                                        start
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

use super::config::{ConfigError, TowerConfig};
use super::lane::Lane;
use super::matcher::{InputBuffer, Matcher};
use super::random::SpawnRandom;
use super::spawner::{draw_word, SpawnSchedule, SpawnTick, Spawner, TickOutcome};

/// Session state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, never started
    #[default]
    NotStarted,
    /// Spawners active, accepting submissions
    Running,
    /// A lane overflowed
    GameOver,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::GameOver => "game_over",
        }
    }

    /// Check if the session accepts ticks and submissions.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Check if the session ended (only a new start leaves this state).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no lane named {0:?}")]
    UnknownLane(String),
}

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Session not running, or the token was blank
    Ignored,
    /// A word was removed from `lane`
    Matched {
        lane: String,
        word: String,
        score: i64,
    },
    /// No lane held the token; no penalty
    Missed { token: String },
}

/// State changes, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started { generation: u64 },
    Spawned { lane: String, word: String, size: usize },
    Matched { lane: String, word: String, score: i64 },
    Missed { token: String },
    Overflowed { lane: String },
}

/// Per-session counters, reset by each start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub words_spawned: u64,
    pub words_matched: u64,
    pub missed_submissions: u64,
    pub ignored_ticks: u64,
}

/// One lane as seen by a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneView {
    pub id: String,
    pub words: Vec<String>,
    pub capacity: usize,
}

/// Everything a UI needs to draw the tower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub status: SessionStatus,
    pub score: i64,
    pub lanes: Vec<LaneView>,
    pub overflowed_lane: Option<String>,
    pub generation: u64,
    pub stats: SessionStats,
}

/// A word tower game session.
#[derive(Debug)]
pub struct GameSession<R = StdRng> {
    config: TowerConfig,

    status: SessionStatus,

    /// Lanes in scan order
    lanes: Vec<Lane>,

    /// Lane id to index in `lanes`
    lane_index: HashMap<String, usize>,

    /// One spawner per lane, same index
    spawners: Vec<Spawner>,

    matcher: Matcher,

    random: R,

    score: i64,

    /// Lane that ended the game
    overflowed_lane: Option<String>,

    /// Bumped by every start; stamps spawner ticks
    generation: u64,

    /// Virtual clock, milliseconds
    now_ms: u64,

    input: InputBuffer,

    /// Events not yet drained
    events: Vec<SessionEvent>,

    stats: SessionStats,

    /// When the current game started
    started_at: Option<chrono::DateTime<chrono::Utc>>,

    /// When the current game ended
    ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl GameSession<StdRng> {
    /// Create a session with an entropy-seeded generator.
    pub fn new(config: TowerConfig) -> Result<Self, ConfigError> {
        Self::with_random(config, StdRng::from_entropy())
    }
}

impl<R: SpawnRandom> GameSession<R> {
    /// Create a session drawing spawn decisions from `random`.
    pub fn with_random(config: TowerConfig, random: R) -> Result<Self, ConfigError> {
        let config = config.validated()?;

        let lanes: Vec<Lane> = config
            .lanes
            .iter()
            .map(|id| Lane::new(id.clone(), config.capacity))
            .collect();
        let lane_index = config
            .lanes
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let spawners = (0..lanes.len())
            .map(|i| Spawner::new(i, config.spawn_period_ms))
            .collect();

        Ok(Self {
            matcher: Matcher::new(config.match_reward),
            config,
            status: SessionStatus::NotStarted,
            lanes,
            lane_index,
            spawners,
            random,
            score: 0,
            overflowed_lane: None,
            generation: 0,
            now_ms: 0,
            input: InputBuffer::new(),
            events: Vec::new(),
            stats: SessionStats::default(),
            started_at: None,
            ended_at: None,
        })
    }

    /// Start a fresh game. Valid from any state.
    ///
    /// Empties every lane, zeroes the score, supersedes any previous game's
    /// spawners and arms new ones for the next generation.
    pub fn start(&mut self) {
        self.cancel_spawners();

        for lane in &mut self.lanes {
            lane.clear();
        }
        self.score = 0;
        self.overflowed_lane = None;
        self.stats = SessionStats::default();
        self.input.clear();
        self.events.clear();
        self.generation += 1;

        let now = self.now_ms;
        let generation = self.generation;
        for spawner in &mut self.spawners {
            spawner.arm(now, generation, &mut self.random);
        }

        self.status = SessionStatus::Running;
        self.started_at = Some(chrono::Utc::now());
        self.ended_at = None;
        self.events.push(SessionEvent::Started { generation });

        info!(
            "Word tower started (generation {}, {} lanes)",
            generation,
            self.lanes.len()
        );
    }

    /// Apply one spawner tick.
    ///
    /// Stale ticks and ticks arriving while not running are no-ops.
    pub fn tick(&mut self, tick: SpawnTick) -> TickOutcome {
        if tick.generation != self.generation
            || !self.status.is_active()
            || tick.lane >= self.lanes.len()
        {
            self.stats.ignored_ticks += 1;
            trace!(
                "Ignoring tick for lane {} (generation {}, current {}, {})",
                tick.lane,
                tick.generation,
                self.generation,
                self.status
            );
            return TickOutcome::Ignored;
        }

        let word = draw_word(
            &mut self.random,
            self.config.spawn_probability,
            &self.config.vocabulary,
        )
        .map(str::to_owned);

        match word {
            Some(word) => self.enqueue(tick.lane, word),
            None => TickOutcome::Idle,
        }
    }

    /// Put a specific word into a lane, bypassing the random draw.
    pub fn spawn_word(&mut self, lane: &str, word: &str) -> Result<TickOutcome, GameError> {
        let index = self
            .lane_index
            .get(lane)
            .copied()
            .ok_or_else(|| GameError::UnknownLane(lane.to_string()))?;

        let word = Matcher::normalize(word);
        if !self.status.is_active() || word.is_empty() {
            return Ok(TickOutcome::Ignored);
        }

        Ok(self.enqueue(index, word))
    }

    /// Advance the virtual clock, firing every spawner tick that falls due.
    ///
    /// Ticks fire in time order, ties in lane order. Stops firing once the
    /// session leaves `Running`; the clock still moves the full `elapsed`,
    /// saturating at `u64::MAX` milliseconds.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TickOutcome> {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let target = self.now_ms.saturating_add(elapsed_ms);
        let mut outcomes = Vec::new();

        while self.status.is_active() {
            let next = self
                .spawners
                .iter()
                .filter_map(|s| s.next_due().map(|due| (due, s.lane())))
                .filter(|(due, _)| *due <= target)
                .min();

            let Some((due, lane)) = next else {
                break;
            };

            self.now_ms = due;
            if let Some(tick) = self.spawners[lane].fire_if_due(due) {
                outcomes.push(self.tick(tick));
            }
        }

        self.now_ms = target;
        outcomes
    }

    /// Submit a typed token.
    ///
    /// Always clears the input buffer. Removes at most one word (the
    /// earliest match in the first lane holding it) and scores once.
    /// Unmatched tokens cost nothing.
    pub fn submit(&mut self, raw: &str) -> SubmitOutcome {
        self.input.clear();

        if !self.status.is_active() {
            return SubmitOutcome::Ignored;
        }

        let token = Matcher::normalize(raw);
        if token.is_empty() {
            return SubmitOutcome::Ignored;
        }

        match self.matcher.remove_match(&mut self.lanes, &token) {
            Some(index) => {
                self.score += self.matcher.reward();
                self.stats.words_matched += 1;

                let lane = self.lanes[index].id().to_string();
                debug!("Matched {:?} in lane {} (score {})", token, lane, self.score);

                self.events.push(SessionEvent::Matched {
                    lane: lane.clone(),
                    word: token.clone(),
                    score: self.score,
                });
                SubmitOutcome::Matched {
                    lane,
                    word: token,
                    score: self.score,
                }
            }
            None => {
                self.stats.missed_submissions += 1;
                debug!("No lane holds {:?}", token);

                self.events.push(SessionEvent::Missed {
                    token: token.clone(),
                });
                SubmitOutcome::Missed { token }
            }
        }
    }

    /// Submit whatever is in the input buffer.
    pub fn submit_input(&mut self) -> SubmitOutcome {
        let text = self.input.take();
        self.submit(&text)
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Virtual clock, milliseconds since creation.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Lanes in scan order.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.lane_index.get(id).map(|&i| &self.lanes[i])
    }

    pub fn overflowed_lane(&self) -> Option<&str> {
        self.overflowed_lane.as_deref()
    }

    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.ended_at
    }

    /// Real-time schedules of the armed spawners (empty unless running).
    pub fn spawn_schedules(&self) -> Vec<SpawnSchedule> {
        self.spawners
            .iter()
            .filter_map(|s| s.schedule(self.now_ms))
            .collect()
    }

    /// Take the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// End-of-game text, once a lane has overflowed.
    pub fn game_over_message(&self) -> Option<String> {
        self.overflowed_lane.as_ref().map(|lane| {
            format!(
                "Game over! The {} lane overflowed. Final score: {}",
                lane, self.score
            )
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            score: self.score,
            lanes: self
                .lanes
                .iter()
                .map(|lane| LaneView {
                    id: lane.id().to_string(),
                    words: lane.words().map(str::to_owned).collect(),
                    capacity: lane.capacity(),
                })
                .collect(),
            overflowed_lane: self.overflowed_lane.clone(),
            generation: self.generation,
            stats: self.stats,
        }
    }

    /// Convert full session state to JSON snapshot.
    pub fn to_json(&self) -> serde_json::Value {
        let lanes: Vec<serde_json::Value> = self.lanes.iter().map(|l| l.to_json()).collect();

        serde_json::json!({
            "status": self.status.as_str(),
            "score": self.score,
            "lanes": lanes,
            "overflowed_lane": self.overflowed_lane,
            "generation": self.generation,
            "started_at": self.started_at,
            "ended_at": self.ended_at,
            "stats": self.stats
        })
    }

    fn enqueue(&mut self, index: usize, word: String) -> TickOutcome {
        let lane = &mut self.lanes[index];
        let size = lane.enqueue(word.clone());
        let overflowed = lane.is_overflowed();
        let lane_id = lane.id().to_string();

        self.stats.words_spawned += 1;
        debug!("Spawned {:?} in lane {} ({} words)", word, lane_id, size);
        self.events.push(SessionEvent::Spawned {
            lane: lane_id.clone(),
            word: word.clone(),
            size,
        });

        if overflowed {
            self.game_over(&lane_id);
            TickOutcome::Overflowed {
                lane: lane_id,
                word,
            }
        } else {
            TickOutcome::Spawned {
                lane: lane_id,
                word,
                size,
            }
        }
    }

    fn game_over(&mut self, lane: &str) {
        self.status = SessionStatus::GameOver;
        self.overflowed_lane = Some(lane.to_string());
        self.ended_at = Some(chrono::Utc::now());
        self.cancel_spawners();
        self.events.push(SessionEvent::Overflowed {
            lane: lane.to_string(),
        });

        info!(
            "Word tower over: lane {} overflowed (score {})",
            lane, self.score
        );
    }

    fn cancel_spawners(&mut self) {
        let cancelled = self
            .spawners
            .iter_mut()
            .map(Spawner::cancel)
            .filter(|&was_armed| was_armed)
            .count();
        if cancelled > 0 {
            debug!(
                "Cancelled {} spawners of generation {}",
                cancelled, self.generation
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::random::ScriptedRandom;
    use pretty_assertions::assert_eq;

    fn make_session(config: TowerConfig, random: ScriptedRandom) -> GameSession<ScriptedRandom> {
        GameSession::with_random(config, random).unwrap()
    }

    fn running(config: TowerConfig) -> GameSession<ScriptedRandom> {
        let mut session = make_session(config, ScriptedRandom::new());
        session.start();
        session
    }

    fn words(session: &GameSession<ScriptedRandom>, lane: &str) -> Vec<String> {
        session
            .lane(lane)
            .unwrap()
            .words()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_new_session() {
        let mut session = make_session(TowerConfig::default(), ScriptedRandom::new());

        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert_eq!(session.score(), 0);
        assert_eq!(session.lanes().len(), 3);
        assert!(session.spawn_schedules().is_empty());

        // Nothing happens before start
        assert_eq!(session.submit("apple"), SubmitOutcome::Ignored);
        assert_eq!(
            session.spawn_word("red", "apple").unwrap(),
            TickOutcome::Ignored
        );
        assert!(session.advance(Duration::from_secs(10)).is_empty());
        assert!(session.lane("red").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_config() {
        let err = GameSession::new(TowerConfig::default().with_capacity(0)).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCapacity));

        let err = GameSession::new(TowerConfig::default().with_spawn_period(Duration::ZERO))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPeriod));
    }

    #[test]
    fn test_spawn_then_match() {
        let mut session = running(TowerConfig::default());

        session.spawn_word("red", "apple").unwrap();
        let outcome = session.submit(" Apple ");

        assert_eq!(
            outcome,
            SubmitOutcome::Matched {
                lane: "red".into(),
                word: "apple".into(),
                score: 100
            }
        );
        assert_eq!(session.score(), 100);
        assert_eq!(session.status(), SessionStatus::Running);
        assert!(session.lane("red").unwrap().is_empty());
    }

    #[test]
    fn test_unmatched_submit_is_free() {
        let mut session = running(TowerConfig::default());
        session.spawn_word("red", "apple").unwrap();

        assert_eq!(
            session.submit("pear"),
            SubmitOutcome::Missed {
                token: "pear".into()
            }
        );
        assert_eq!(session.score(), 0);
        assert_eq!(words(&session, "red"), vec!["apple"]);
        assert_eq!(session.stats().missed_submissions, 1);
    }

    #[test]
    fn test_blank_submit_ignored() {
        let mut session = running(TowerConfig::default());
        assert_eq!(session.submit("   "), SubmitOutcome::Ignored);
        assert_eq!(session.stats().missed_submissions, 0);
    }

    #[test]
    fn test_submit_always_clears_input() {
        let mut session = running(TowerConfig::default());
        session.spawn_word("green", "kiwi").unwrap();

        // Match
        session.input_mut().push_str("KIWI");
        assert!(matches!(
            session.submit_input(),
            SubmitOutcome::Matched { .. }
        ));
        assert!(session.input().is_empty());

        // Miss
        session.input_mut().push_str("kiwi");
        assert!(matches!(
            session.submit_input(),
            SubmitOutcome::Missed { .. }
        ));
        assert!(session.input().is_empty());

        // Direct submit with leftover text in the buffer
        session.input_mut().push_str("half-typ");
        session.submit("mango");
        assert!(session.input().is_empty());

        // Ignored after game over
        let mut session = running(TowerConfig::default().with_capacity(1));
        session.spawn_word("red", "a").unwrap();
        session.spawn_word("red", "b").unwrap();
        session.input_mut().push_str("a");
        assert_eq!(session.submit_input(), SubmitOutcome::Ignored);
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_tie_break_uses_lane_order() {
        let mut session = running(TowerConfig::default());
        session.spawn_word("blue", "kiwi").unwrap();
        session.spawn_word("green", "kiwi").unwrap();

        let outcome = session.submit("kiwi");

        assert!(matches!(outcome, SubmitOutcome::Matched { ref lane, .. } if lane == "green"));
        assert!(session.lane("green").unwrap().is_empty());
        assert_eq!(words(&session, "blue"), vec!["kiwi"]);
    }

    #[test]
    fn test_overflow_boundary() {
        let mut session = running(TowerConfig::default());

        for i in 1..=40 {
            assert_eq!(
                session.spawn_word("red", "fig").unwrap(),
                TickOutcome::Spawned {
                    lane: "red".into(),
                    word: "fig".into(),
                    size: i
                }
            );
        }
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.overflowed_lane(), None);

        let outcome = session.spawn_word("red", "fig").unwrap();
        assert!(outcome.is_overflow());
        assert_eq!(session.status(), SessionStatus::GameOver);
        assert_eq!(session.overflowed_lane(), Some("red"));
        assert_eq!(session.lane("red").unwrap().len(), 41);
    }

    #[test]
    fn test_small_capacity_overflow() {
        let mut session = running(TowerConfig::default().with_capacity(2));

        session.spawn_word("blue", "a").unwrap();
        session.spawn_word("blue", "b").unwrap();
        assert_eq!(session.status(), SessionStatus::Running);

        let outcome = session.spawn_word("blue", "c").unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Overflowed {
                lane: "blue".into(),
                word: "c".into()
            }
        );
        assert_eq!(session.status(), SessionStatus::GameOver);
        assert_eq!(session.overflowed_lane(), Some("blue"));
        assert!(session.ended_at().is_some());
        assert_eq!(
            session.game_over_message().unwrap(),
            "Game over! The blue lane overflowed. Final score: 0"
        );
    }

    #[test]
    fn test_removal_does_not_undo_overflow() {
        let mut session = running(TowerConfig::default().with_capacity(1));
        session.spawn_word("red", "a").unwrap();
        session.spawn_word("red", "b").unwrap();

        assert_eq!(session.submit("a"), SubmitOutcome::Ignored);
        assert_eq!(session.status(), SessionStatus::GameOver);
        assert_eq!(session.lane("red").unwrap().len(), 2);
    }

    #[test]
    fn test_nothing_runs_after_game_over() {
        let random = ScriptedRandom::new().with_chances(vec![true; 100]);
        let mut session = make_session(TowerConfig::default().with_capacity(1), random);
        session.start();
        let stale = session.spawn_schedules()[0].tick;

        session.spawn_word("red", "a").unwrap();
        session.spawn_word("red", "b").unwrap();
        assert_eq!(session.status(), SessionStatus::GameOver);

        assert!(session.spawn_schedules().is_empty());
        assert!(session.advance(Duration::from_secs(60)).is_empty());
        assert_eq!(session.tick(stale), TickOutcome::Ignored);
        assert_eq!(
            session.spawn_word("green", "a").unwrap(),
            TickOutcome::Ignored
        );
        assert!(session.lane("green").unwrap().is_empty());
    }

    #[test]
    fn test_stale_generation_ignored() {
        let random = ScriptedRandom::new().with_chances(vec![true; 10]);
        let mut session = make_session(TowerConfig::default(), random);
        session.start();
        let old = session.spawn_schedules()[0].tick;

        session.start();
        let new = session.spawn_schedules()[0].tick;
        assert_eq!(new.generation, old.generation + 1);

        assert_eq!(session.tick(old), TickOutcome::Ignored);
        assert_eq!(session.stats().ignored_ticks, 1);
        assert!(session.lane("red").unwrap().is_empty());

        assert_eq!(session.tick(new).word(), Some("apple"));
        assert_eq!(words(&session, "red"), vec!["apple"]);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = running(TowerConfig::default().with_capacity(1));
        session.spawn_word("green", "kiwi").unwrap();
        session.submit("kiwi");
        session.spawn_word("red", "a").unwrap();
        session.spawn_word("red", "b").unwrap();
        assert_eq!(session.status(), SessionStatus::GameOver);

        session.start();

        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.score(), 0);
        assert_eq!(session.overflowed_lane(), None);
        assert_eq!(session.generation(), 2);
        assert_eq!(session.stats(), &SessionStats::default());
        assert!(session.ended_at().is_none());
        assert!(session.lanes().iter().all(|l| l.is_empty() && !l.is_overflowed()));
        assert_eq!(session.spawn_schedules().len(), 3);
    }

    #[test]
    fn test_advance_fires_by_phase() {
        // vocabulary: apple banana cherry date fig grape kiwi lemon mango pear
        let random = ScriptedRandom::new()
            .with_phases([100, 200, 300])
            .spawn(0)
            .idle()
            .spawn(6);
        let mut session = make_session(TowerConfig::default(), random);
        session.start();

        assert!(session.advance(Duration::from_millis(99)).is_empty());

        let outcomes = session.advance(Duration::from_millis(901));
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Spawned {
                    lane: "red".into(),
                    word: "apple".into(),
                    size: 1
                },
                TickOutcome::Idle,
                TickOutcome::Spawned {
                    lane: "blue".into(),
                    word: "kiwi".into(),
                    size: 1
                },
            ]
        );
        assert_eq!(session.now_ms(), 1000);
        assert!(session.lane("green").unwrap().is_empty());

        // Next round: red at 1100, green at 1200, blue at 1300
        assert_eq!(session.advance(Duration::from_millis(300)).len(), 3);
    }

    #[test]
    fn test_advance_lockstep_ties_in_lane_order() {
        let random = ScriptedRandom::new().spawn(0).spawn(1).spawn(2);
        let mut session = make_session(TowerConfig::default(), random);
        session.start();

        let lanes: Vec<String> = session
            .advance(Duration::from_secs(1))
            .into_iter()
            .filter_map(|o| match o {
                TickOutcome::Spawned { lane, .. } => Some(lane),
                _ => None,
            })
            .collect();

        assert_eq!(lanes, vec!["red", "green", "blue"]);
    }

    #[test]
    fn test_advance_stops_at_overflow() {
        let random = ScriptedRandom::new().with_chances(vec![true; 20]);
        let config = TowerConfig::default()
            .with_lanes(["red"])
            .with_capacity(1);
        let mut session = make_session(config, random);
        session.start();

        let outcomes = session.advance(Duration::from_secs(10));

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[1].is_overflow());
        assert_eq!(session.status(), SessionStatus::GameOver);
        assert_eq!(session.now_ms(), 10_000);
        assert_eq!(session.stats().words_spawned, 2);
    }

    #[test]
    fn test_start_after_clock_exhausted() {
        let random = ScriptedRandom::new().with_chances(vec![true; 10]);
        let mut session = make_session(TowerConfig::default(), random);
        session.advance(Duration::MAX);
        assert_eq!(session.now_ms(), u64::MAX);

        session.start();
        assert_eq!(session.status(), SessionStatus::Running);

        // Each spawner gets one last tick at the end of the clock, then stops
        let outcomes = session.advance(Duration::from_secs(5));
        assert_eq!(outcomes.len(), 3);
        assert!(session.advance(Duration::from_secs(5)).is_empty());
        assert_eq!(session.stats().words_spawned, 3);
    }

    #[test]
    fn test_seeded_rng_spawns_every_period() {
        let config = TowerConfig::default().with_spawn_probability(1.0);
        let mut session = GameSession::with_random(config, StdRng::seed_from_u64(42)).unwrap();
        session.start();

        let outcomes = session.advance(Duration::from_secs(5));

        assert_eq!(outcomes.len(), 15);
        assert_eq!(session.stats().words_spawned, 15);
        for lane in session.lanes() {
            assert_eq!(lane.len(), 5);
            assert!(lane
                .words()
                .all(|w| session.config().vocabulary.iter().any(|v| v == w)));
        }
    }

    #[test]
    fn test_unknown_lane() {
        let mut session = running(TowerConfig::default());
        assert_eq!(
            session.spawn_word("purple", "fig"),
            Err(GameError::UnknownLane("purple".into()))
        );
    }

    #[test]
    fn test_events_in_order() {
        let mut session = running(TowerConfig::default().with_capacity(1));
        session.spawn_word("red", "fig").unwrap();
        session.submit("fig");
        session.submit("fig");
        session.spawn_word("green", "a").unwrap();
        session.spawn_word("green", "b").unwrap();

        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::Started { generation: 1 },
                SessionEvent::Spawned {
                    lane: "red".into(),
                    word: "fig".into(),
                    size: 1
                },
                SessionEvent::Matched {
                    lane: "red".into(),
                    word: "fig".into(),
                    score: 100
                },
                SessionEvent::Missed {
                    token: "fig".into()
                },
                SessionEvent::Spawned {
                    lane: "green".into(),
                    word: "a".into(),
                    size: 1
                },
                SessionEvent::Spawned {
                    lane: "green".into(),
                    word: "b".into(),
                    size: 2
                },
                SessionEvent::Overflowed {
                    lane: "green".into()
                },
            ]
        );
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut session = running(TowerConfig::default().with_lanes(["left", "right"]));
        session.spawn_word("right", "Pear").unwrap();

        assert_eq!(
            session.snapshot(),
            Snapshot {
                status: SessionStatus::Running,
                score: 0,
                lanes: vec![
                    LaneView {
                        id: "left".into(),
                        words: vec![],
                        capacity: 40
                    },
                    LaneView {
                        id: "right".into(),
                        words: vec!["pear".into()],
                        capacity: 40
                    },
                ],
                overflowed_lane: None,
                generation: 1,
                stats: SessionStats {
                    words_spawned: 1,
                    ..SessionStats::default()
                },
            }
        );
    }

    #[test]
    fn test_to_json() {
        let mut session = running(TowerConfig::default().with_lanes(["red"]));
        session.spawn_word("red", "fig").unwrap();

        let json = session.to_json();
        assert_eq!(json["status"], "running");
        assert_eq!(json["lanes"][0]["words"], serde_json::json!(["fig"]));
        assert_eq!(json["overflowed_lane"], serde_json::Value::Null);
        assert_eq!(json["stats"]["words_spawned"], 1);
        assert!(json["started_at"].is_string());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SessionStatus::NotStarted.as_str(), "not_started");
        assert_eq!(SessionStatus::GameOver.to_string(), "game_over");
        assert!(SessionStatus::Running.is_active());
        assert!(SessionStatus::GameOver.is_terminal());
        assert!(!SessionStatus::NotStarted.is_terminal());
    }
}
