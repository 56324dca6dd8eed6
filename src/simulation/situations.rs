//! Emergent crises that feed on themselves until a threshold clears them.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulation::{
    GameDate, GameState, LogCategory, NotificationKind, Rejection, StatDelta, ensure_budget,
};

pub const PROGRESS_RATE: f64 = 0.1;
pub const SEVERITY_GROWTH: f64 = 1.0;
pub const SEVERITY_RELIEF: f64 = 0.4;
pub const PROGRESS_RELIEF: f64 = 0.3;
/// Severity at or under which event-started crises subside.
pub const SUBSIDED_SEVERITY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationKind {
    Hyperinflation,
    Insurgency,
    LaborCrisis,
    Pandemic,
    Drought,
}

impl SituationKind {
    pub fn id(self) -> &'static str {
        match self {
            SituationKind::Hyperinflation => "hyperinflation",
            SituationKind::Insurgency => "insurgency",
            SituationKind::LaborCrisis => "labor_crisis",
            SituationKind::Pandemic => "pandemic",
            SituationKind::Drought => "drought",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SituationKind::Hyperinflation => "Hyperinflation",
            SituationKind::Insurgency => "Insurgency",
            SituationKind::LaborCrisis => "Labor crisis",
            SituationKind::Pandemic => "Pandemic",
            SituationKind::Drought => "Drought",
        }
    }

    fn initial_severity(self) -> f64 {
        match self {
            SituationKind::Hyperinflation | SituationKind::LaborCrisis => 30.0,
            SituationKind::Insurgency => 40.0,
            SituationKind::Pandemic => 35.0,
            SituationKind::Drought => 25.0,
        }
    }

    fn should_spawn(self, state: &GameState) -> bool {
        match self {
            SituationKind::Hyperinflation => state.stats.inflation > 0.15,
            SituationKind::Insurgency => state.resources.stability < 30.0,
            SituationKind::LaborCrisis => state.stats.unemployment > 0.20,
            SituationKind::Pandemic | SituationKind::Drought => false,
        }
    }

    fn is_resolved(self, state: &GameState, situation: &Situation) -> bool {
        match self {
            SituationKind::Hyperinflation => state.stats.inflation < 0.08,
            SituationKind::Insurgency => state.resources.stability > 50.0,
            SituationKind::LaborCrisis => state.stats.unemployment < 0.12,
            SituationKind::Pandemic | SituationKind::Drought => {
                situation.severity <= SUBSIDED_SEVERITY
            }
        }
    }

    /// Pressure applied every day the situation stays open.
    fn daily_pressure(self) -> StatDelta {
        match self {
            SituationKind::Hyperinflation => StatDelta {
                inflation: 0.0005,
                popularity: -0.1,
                ..Default::default()
            },
            SituationKind::Insurgency => StatDelta {
                stability: -0.2,
                gdp: -0.5,
                ..Default::default()
            },
            SituationKind::LaborCrisis => StatDelta {
                popularity: -0.1,
                stability: -0.05,
                ..Default::default()
            },
            SituationKind::Pandemic => StatDelta {
                gdp: -0.8,
                popularity: -0.1,
                stability: -0.05,
                ..Default::default()
            },
            SituationKind::Drought => StatDelta {
                gdp: -0.4,
                inflation: 0.0002,
                ..Default::default()
            },
        }
    }

    const SPONTANEOUS: [SituationKind; 3] = [
        SituationKind::Hyperinflation,
        SituationKind::Insurgency,
        SituationKind::LaborCrisis,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    pub id: String,
    pub kind: SituationKind,
    pub severity: f64,
    pub progress: f64,
    /// Set once progress first reaches 100.
    pub exploded: bool,
    pub started_on: GameDate,
}

/// Begins tracking a situation unless one of that kind is already open.
pub fn start_situation(state: &mut GameState, kind: SituationKind) -> bool {
    if state.events.situations.iter().any(|s| s.kind == kind) {
        return false;
    }
    info!(situation = kind.id(), "situation started");
    state.events.situations.push(Situation {
        id: kind.id().to_string(),
        kind,
        severity: kind.initial_severity(),
        progress: 0.0,
        exploded: false,
        started_on: state.time.date,
    });
    state.log(LogCategory::Crisis, format!("{} has broken out", kind.title()));
    state.notify(
        NotificationKind::Warning,
        kind.title(),
        format!("A {} is developing.", kind.title().to_lowercase()),
    );
    true
}

pub fn tick_situations(state: &mut GameState) {
    for kind in SituationKind::SPONTANEOUS {
        if kind.should_spawn(state) {
            start_situation(state, kind);
        }
    }

    let mut situations = std::mem::take(&mut state.events.situations);
    for situation in &mut situations {
        situation.progress = (situation.progress + situation.severity * PROGRESS_RATE).min(100.0);
        situation.severity = (situation.severity + SEVERITY_GROWTH).min(100.0);
        situation.kind.daily_pressure().apply(state);

        if situation.progress >= 100.0 && !situation.exploded {
            situation.exploded = true;
            state.log(
                LogCategory::Crisis,
                format!("{} is out of control", situation.kind.title()),
            );
            state.notify(
                NotificationKind::Danger,
                situation.kind.title(),
                "The crisis has exploded.",
            );
        }
    }

    situations.retain(|situation| {
        let resolved = situation.kind.is_resolved(state, situation);
        if resolved {
            state.log(
                LogCategory::Crisis,
                format!("{} resolved", situation.kind.title()),
            );
            state.notify(
                NotificationKind::Success,
                situation.kind.title(),
                "The crisis has been resolved.",
            );
        }
        !resolved
    });
    state.events.situations = situations;
}

/// Percentage shares of an emergency budget across four fronts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAllocation {
    pub health: f64,
    pub security: f64,
    pub economy: f64,
    pub logistics: f64,
}

impl EmergencyAllocation {
    pub fn balanced() -> Self {
        Self {
            health: 25.0,
            security: 25.0,
            economy: 25.0,
            logistics: 25.0,
        }
    }

    fn shares(&self) -> [f64; 4] {
        [self.health, self.security, self.economy, self.logistics]
    }

    pub fn total(&self) -> f64 {
        self.shares().iter().sum()
    }
}

/// `100 - 5σ` over the four shares, clamped to `[0, 100]`.
pub fn emergency_effectiveness(allocation: &EmergencyAllocation) -> f64 {
    let shares = allocation.shares();
    let mean = shares.iter().sum::<f64>() / shares.len() as f64;
    let variance = shares.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / shares.len() as f64;
    (100.0 - 5.0 * variance.sqrt()).clamp(0.0, 100.0)
}

pub fn respond_to_situation(
    state: &mut GameState,
    situation_id: &str,
    allocation: &EmergencyAllocation,
    cost: f64,
) -> Result<f64, Rejection> {
    if allocation.shares().iter().any(|s| !s.is_finite() || *s < 0.0)
        || (allocation.total() - 100.0).abs() > 0.5
    {
        return Err(Rejection::precondition(
            "emergency allocation must split 100% across the four fronts",
        ));
    }
    let index = state
        .events
        .situations
        .iter()
        .position(|s| s.id == situation_id)
        .ok_or_else(|| Rejection::unknown("situation", situation_id))?;
    ensure_budget(state, cost)?;

    let effectiveness = emergency_effectiveness(allocation);
    state.adjust_budget(-cost);
    let situation = &mut state.events.situations[index];
    situation.severity = (situation.severity - effectiveness * SEVERITY_RELIEF).max(0.0);
    situation.progress = (situation.progress - effectiveness * PROGRESS_RELIEF).max(0.0);
    if situation.progress < 100.0 {
        situation.exploded = false;
    }
    let title = situation.kind.title();
    state.log(
        LogCategory::Crisis,
        format!("Emergency response to {title} ({effectiveness:.0}% effective)"),
    );
    Ok(effectiveness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn balanced_allocation_is_fully_effective() {
        assert!(approx(emergency_effectiveness(&EmergencyAllocation::balanced()), 100.0));
        let lopsided = EmergencyAllocation {
            health: 100.0,
            security: 0.0,
            economy: 0.0,
            logistics: 0.0,
        };
        assert!(approx(emergency_effectiveness(&lopsided), 0.0));
        let mild = EmergencyAllocation {
            health: 30.0,
            security: 20.0,
            economy: 25.0,
            logistics: 25.0,
        };
        // sigma = sqrt((25 + 25) / 4)
        assert!(approx(emergency_effectiveness(&mild), 100.0 - 5.0 * 12.5f64.sqrt()));
    }

    #[test]
    fn thresholds_spawn_once() {
        let mut state = GameState::default();
        state.stats.inflation = 0.2;
        tick_situations(&mut state);
        tick_situations(&mut state);
        let open: Vec<_> = state.events.situations.iter().map(|s| s.kind).collect();
        assert_eq!(open, vec![SituationKind::Hyperinflation]);
    }

    #[test]
    fn situations_intensify_then_explode_once() {
        let mut state = GameState::default();
        state.resources.stability = 20.0;
        tick_situations(&mut state);
        let s = &state.events.situations[0];
        assert_eq!(s.kind, SituationKind::Insurgency);
        assert!(approx(s.progress, 4.0));
        assert!(approx(s.severity, 41.0));

        for _ in 0..40 {
            tick_situations(&mut state);
        }
        let s = &state.events.situations[0];
        assert!(s.exploded);
        assert_eq!(s.progress, 100.0);
        assert_eq!(s.severity, 81.0);
        let dangers = state
            .notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::Danger)
            .count();
        assert_eq!(dangers, 1);
    }

    #[test]
    fn clearing_the_threshold_resolves() {
        let mut state = GameState::default();
        state.stats.unemployment = 0.25;
        tick_situations(&mut state);
        assert_eq!(state.events.situations.len(), 1);
        state.stats.unemployment = 0.10;
        tick_situations(&mut state);
        assert!(state.events.situations.is_empty());
        assert!(state
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::Success));
    }

    #[test]
    fn emergency_response_spends_and_relieves() {
        let mut state = GameState::default();
        state.resources.budget = 5.0;
        start_situation(&mut state, SituationKind::Pandemic);

        let bad = EmergencyAllocation {
            health: 50.0,
            ..EmergencyAllocation::balanced()
        };
        assert!(matches!(
            respond_to_situation(&mut state, "pandemic", &bad, 2.0),
            Err(Rejection::Precondition(_))
        ));
        assert!(matches!(
            respond_to_situation(&mut state, "plague", &EmergencyAllocation::balanced(), 2.0),
            Err(Rejection::UnknownTarget { .. })
        ));

        let eff = respond_to_situation(&mut state, "pandemic", &EmergencyAllocation::balanced(), 2.0)
            .expect("response");
        assert_eq!(eff, 100.0);
        assert_eq!(state.resources.budget, 3.0);
        assert_eq!(state.events.situations[0].severity, 0.0);

        tick_situations(&mut state);
        assert!(state.events.situations.is_empty());

        state.resources.budget = 1.0;
        start_situation(&mut state, SituationKind::Drought);
        assert!(matches!(
            respond_to_situation(&mut state, "drought", &EmergencyAllocation::balanced(), 2.0),
            Err(Rejection::InsufficientBudget { .. })
        ));
    }

    #[test]
    fn malformed_allocations_leave_the_crisis_alone() {
        let mut state = GameState::default();
        state.resources.budget = 50.0;
        start_situation(&mut state, SituationKind::Pandemic);
        let before = state.clone();
        let id = SituationKind::Pandemic.id();
        let poisoned = [
            EmergencyAllocation {
                health: f64::NAN,
                ..EmergencyAllocation::balanced()
            },
            EmergencyAllocation {
                security: f64::INFINITY,
                economy: f64::NEG_INFINITY,
                ..EmergencyAllocation::balanced()
            },
        ];
        for allocation in &poisoned {
            assert!(matches!(
                respond_to_situation(&mut state, id, allocation, 2.0),
                Err(Rejection::Precondition(_))
            ));
        }
        assert_eq!(state, before);
        assert!(state.events.situations[0].severity > 0.0);
    }
}
