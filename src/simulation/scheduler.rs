//! Real-time pacing of the simulated calendar.

use std::time::Instant;

use crate::simulation::{Action, GameState, Simulation};

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Paused, not started, or a decision is pending.
    Idle,
    /// Running, but the day interval has not elapsed yet.
    Waiting,
    /// One day passed; `month` is set when the monthly update ran as well.
    Advanced { state: GameState, month: bool },
}

/// Decides on every frame whether a simulated day is due. At most one day
/// advances per frame; intervals missed while the host was busy are dropped.
#[derive(Debug, Clone)]
pub struct Scheduler {
    last_tick: Instant,
}

impl Scheduler {
    pub fn new(now: Instant) -> Self {
        Self { last_tick: now }
    }

    pub fn last_tick(&self) -> Instant {
        self.last_tick
    }

    pub fn frame(&mut self, now: Instant, simulation: &mut Simulation, state: &GameState) -> FrameOutcome {
        if !state.is_started() || !state.time.is_playing || state.events.active_event.is_some() {
            return FrameOutcome::Idle;
        }
        let Some(interval) = simulation.config().day_interval(state.time.speed) else {
            return FrameOutcome::Idle;
        };
        if now.saturating_duration_since(self.last_tick) < interval {
            return FrameOutcome::Waiting;
        }
        self.last_tick = now;

        let mut next = simulation.dispatch(state, Action::AdvanceDay);
        let month = state.time.date.crosses_month(&next.time.date);
        if month {
            next = simulation.dispatch(&next, Action::AdvanceMonth);
        }
        FrameOutcome::Advanced { state: next, month }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::simulation::testing::{fixture_simulation, fixture_state};
    use crate::simulation::{EventSource, GameDate, fire_event};

    #[test]
    fn waits_for_the_day_interval() {
        let mut sim = fixture_simulation(vec![0.99]);
        let state = fixture_state();
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start);

        assert_eq!(
            scheduler.frame(start + Duration::from_millis(999), &mut sim, &state),
            FrameOutcome::Waiting
        );
        let FrameOutcome::Advanced { state: next, month } =
            scheduler.frame(start + Duration::from_millis(1_000), &mut sim, &state)
        else {
            panic!("a day should pass");
        };
        assert!(!month);
        assert_eq!(next.time.date, state.time.date.next_day());
        assert_eq!(scheduler.last_tick(), start + Duration::from_millis(1_000));
    }

    #[test]
    fn never_catches_up_on_missed_days() {
        let mut sim = fixture_simulation(vec![0.99]);
        let state = fixture_state();
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start);
        let FrameOutcome::Advanced { state: next, .. } =
            scheduler.frame(start + Duration::from_secs(10), &mut sim, &state)
        else {
            panic!("a day should pass");
        };
        assert_eq!(next.time.date, state.time.date.add_days(1));
    }

    #[test]
    fn idles_while_paused_or_deciding() {
        let mut sim = fixture_simulation(vec![0.99]);
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start);
        let later = start + Duration::from_secs(5);

        let mut paused = fixture_state();
        paused.time.is_playing = false;
        assert_eq!(scheduler.frame(later, &mut sim, &paused), FrameOutcome::Idle);

        let mut deciding = fixture_state();
        let event = sim.content().event("budget_leak").cloned().expect("fixture event");
        fire_event(&mut deciding, &event, EventSource::Random);
        assert_eq!(scheduler.frame(later, &mut sim, &deciding), FrameOutcome::Idle);
        assert_eq!(scheduler.last_tick(), start);
    }

    #[test]
    fn month_boundary_runs_the_monthly_update() {
        let mut sim = fixture_simulation(vec![0.99]);
        let mut state = fixture_state();
        state.time.date = GameDate::new(2024, 1, 31);
        state.time.speed = 3;
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start);
        let FrameOutcome::Advanced { state: next, month } =
            scheduler.frame(start + Duration::from_millis(200), &mut sim, &state)
        else {
            panic!("a day should pass");
        };
        assert!(month);
        assert_eq!(next.time.date, GameDate::new(2024, 2, 1));
        assert_ne!(next.resources.budget, state.resources.budget);
    }
}
