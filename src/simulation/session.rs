//! A running game: one tokio task owns the simulation, the scheduler and the
//! current snapshot. Player actions queue on a channel and are applied
//! between frames, so the clock and the player never interleave mid-update.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::simulation::{Action, FrameOutcome, GameState, Scheduler, Simulation};

pub struct GameSession {
    actions: mpsc::UnboundedSender<Action>,
    snapshots: watch::Receiver<GameState>,
    shutdown: Arc<Notify>,
    task: JoinHandle<GameState>,
}

impl GameSession {
    /// Spawns the session task on the current tokio runtime.
    pub fn spawn(simulation: Simulation, initial: GameState) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(initial.clone());
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(run(
            simulation,
            initial,
            actions_rx,
            snapshots_tx,
            shutdown.clone(),
        ));
        Self {
            actions: actions_tx,
            snapshots: snapshots_rx,
            shutdown,
            task,
        }
    }

    /// Queues an action; false once the session task has stopped.
    pub fn submit(&self, action: Action) -> bool {
        self.actions.send(action).is_ok()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> GameState {
        self.snapshots.borrow().clone()
    }

    /// Stops the loop, applies whatever was still queued and returns the final state.
    pub async fn shutdown(self) -> Result<GameState, JoinError> {
        self.shutdown.notify_one();
        self.task.await
    }
}

async fn run(
    mut simulation: Simulation,
    mut state: GameState,
    mut actions: mpsc::UnboundedReceiver<Action>,
    snapshots: watch::Sender<GameState>,
    shutdown: Arc<Notify>,
) -> GameState {
    let mut frames = time::interval(simulation.config().frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut scheduler = Scheduler::new(Instant::now().into_std());
    info!(date = %state.time.date, "session started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.notified() => break,
            received = actions.recv() => match received {
                Some(action) => {
                    state = simulation.dispatch(&state, action);
                    snapshots.send_replace(state.clone());
                }
                // Every handle is gone; nobody can submit or shut down any more.
                None => break,
            },
            _ = frames.tick() => {
                let outcome = scheduler.frame(Instant::now().into_std(), &mut simulation, &state);
                if let FrameOutcome::Advanced { state: next, month } = outcome {
                    debug!(date = %next.time.date, month, "day advanced");
                    state = next;
                    snapshots.send_replace(state.clone());
                }
            }
        }
    }

    while let Ok(action) = actions.try_recv() {
        state = simulation.dispatch(&state, action);
    }
    snapshots.send_replace(state.clone());
    info!(date = %state.time.date, "session stopped");
    state
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::simulation::testing::{fixture_simulation, fixture_state};

    #[tokio::test(start_paused = true)]
    async fn days_pass_until_paused() {
        let state = fixture_state();
        let start = state.time.date;
        let session = GameSession::spawn(fixture_simulation(vec![0.99]), state);
        let mut updates = session.subscribe();

        time::sleep(Duration::from_millis(2_500)).await;
        assert!(session.snapshot().time.date > start);

        assert!(session.submit(Action::SetSpeed { speed: 0 }));
        updates.changed().await.expect("session alive");
        time::sleep(Duration::from_millis(50)).await;
        let paused = session.snapshot();
        assert!(!paused.time.is_playing);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.snapshot().time.date, paused.time.date);

        let last = session.shutdown().await.expect("task joins");
        assert_eq!(last.time.date, paused.time.date);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshots, mut updates) = watch::channel(fixture_state());
        let task = tokio::spawn(run(
            fixture_simulation(vec![0.99]),
            fixture_state(),
            rx,
            snapshots,
            Arc::new(Notify::new()),
        ));
        drop(tx);
        let last = time::timeout(Duration::from_secs(60), task)
            .await
            .expect("loop exits once its senders are gone")
            .expect("task joins");
        updates.changed().await.expect("final snapshot published");
        assert_eq!(updates.borrow().time.date, last.time.date);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_actions_survive_shutdown() {
        let mut state = fixture_state();
        state.time.is_playing = false;
        let censorship = state.social.media.censorship;
        let session = GameSession::spawn(fixture_simulation(vec![0.99]), state);
        session.submit(Action::CensorMedia);
        let last = session.shutdown().await.expect("task joins");
        assert!(last.social.media.censorship > censorship);
    }
}
