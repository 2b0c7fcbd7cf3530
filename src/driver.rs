//! Real-time driver.
//!
//! Runs a [`GameSession`] as an actor task. Each lane gets its own timer
//! task; timers and UI calls only ever send messages, and the actor applies
//! them one at a time, so the session sees a single ordered stream of
//! mutations. Timer ticks travel on their own channel, separate from UI
//! commands, so the command channel closes as soon as the last handle is
//! dropped even while timers are alive.
//!
//! ```text
//!  lane timers ──SpawnTick──────┐  (ticks channel)
//!                                ▼
//!  TowerHandle ──Start/Submit──▶ actor (owns GameSession) ──▶ watch<Snapshot>
//!              (commands channel)                        └──▶ broadcast<SessionEvent>
//! ```

use log::{debug, info};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::{
    ConfigError, GameSession, SessionEvent, Snapshot, SpawnRandom, SpawnSchedule, SpawnTick,
    TowerConfig,
};

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_BUFFER: usize = 256;

/// Driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("tower session has shut down")]
    Closed,
}

#[derive(Debug)]
enum Command {
    Start,
    Submit(String),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running tower actor. Cheap to clone.
///
/// The actor stops when every handle is dropped or on [`TowerHandle::shutdown`].
#[derive(Debug, Clone)]
pub struct TowerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl TowerHandle {
    /// Build a session from `config` and spawn its actor on the current
    /// tokio runtime.
    pub fn spawn(config: TowerConfig) -> Result<Self, ConfigError> {
        let session = GameSession::new(config)?;
        Ok(Self::spawn_session(session))
    }

    /// Spawn an actor around an existing session.
    pub fn spawn_session<R>(session: GameSession<R>) -> Self
    where
        R: SpawnRandom + Send + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(session.snapshot());
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        let actor = TowerActor {
            session,
            ticks: ticks_tx,
            timers: Vec::new(),
            snapshots: snapshots_tx,
            events: events_tx.clone(),
        };
        tokio::spawn(actor.run(commands_rx, ticks_rx));

        Self {
            commands: commands_tx,
            snapshots: snapshots_rx,
            events: events_tx,
        }
    }

    /// Start (or restart) the game.
    pub fn start(&self) -> Result<(), DriverError> {
        self.send(Command::Start)
    }

    /// Submit a typed token.
    pub fn submit(&self, token: impl Into<String>) -> Result<(), DriverError> {
        self.send(Command::Submit(token.into()))
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Receive every session event from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stop the actor and all lane timers.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Shutdown(ack_tx))?;
        ack_rx.await.map_err(|_| DriverError::Closed)
    }

    fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands.send(command).map_err(|_| DriverError::Closed)
    }
}

struct TowerActor<R> {
    session: GameSession<R>,
    /// Handed to every lane timer
    ticks: mpsc::UnboundedSender<SpawnTick>,
    timers: Vec<JoinHandle<()>>,
    snapshots: watch::Sender<Snapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl<R: SpawnRandom> TowerActor<R> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut ticks: mpsc::UnboundedReceiver<SpawnTick>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Start) => self.start(),
                    Some(Command::Submit(token)) => {
                        self.session.submit(&token);
                    }
                    Some(Command::Shutdown(ack)) => {
                        // Refuse further commands before acknowledging
                        commands.close();
                        self.stop_timers();
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        self.stop_timers();
                        break;
                    }
                },
                Some(tick) = ticks.recv() => {
                    self.session.tick(tick);
                }
            }

            if !self.session.status().is_active() {
                self.stop_timers();
            }
            self.publish();
        }

        info!("Word tower actor stopped");
    }

    fn start(&mut self) {
        self.stop_timers();
        self.session.start();

        for schedule in self.session.spawn_schedules() {
            self.timers.push(spawn_lane_timer(self.ticks.clone(), schedule));
        }
    }

    /// Abort every lane timer. Each timer is aborted once; the list is
    /// emptied.
    fn stop_timers(&mut self) {
        if self.timers.is_empty() {
            return;
        }
        debug!("Stopping {} lane timers", self.timers.len());
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    fn publish(&mut self) {
        for event in self.session.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.session.snapshot());
    }
}

fn spawn_lane_timer(
    ticks: mpsc::UnboundedSender<SpawnTick>,
    schedule: SpawnSchedule,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(schedule.first_delay).await;

        let mut interval = tokio::time::interval(schedule.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if ticks.send(schedule.tick).is_err() {
                break;
            }
        }
    })
}
