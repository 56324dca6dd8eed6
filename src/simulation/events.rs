//! Narrative events: definitions, eligibility, weighted selection, firing,
//! delayed registrations, scandal synthesis and choice resolution.

use std::collections::BTreeMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::simulation::dice::{chance, pick_index, roll};
use crate::simulation::{
    ContentLibrary, EventCondition, GameDate, GameState, GroupKind, LogCategory, MinisterTrait,
    NotificationKind, Predicate, Rejection, SimulationConfig, SituationKind, StatDelta, StoryValue,
    apply_approval_effect, dismiss_minister, evaluate_condition, start_situation, storyline,
};

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEffect {
    pub group: GroupKind,
    pub amount: f64,
    /// Months before the shift is reverted; zero keeps it for good.
    #[serde(default)]
    pub duration_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedEventSpec {
    pub event_id: String,
    pub delay_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Consequences {
    pub effects: StatDelta,
    pub story_vars: BTreeMap<String, StoryValue>,
    pub approval: Vec<ApprovalEffect>,
    pub delayed: Option<DelayedEventSpec>,
    pub start_situation: Option<SituationKind>,
    /// Minister id removed from the cabinet.
    pub dismiss_minister: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChoice {
    pub label: String,
    #[serde(default)]
    pub consequences: Consequences,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Chained events may fire repeatedly.
    #[serde(default)]
    pub chain_id: Option<String>,
    /// Only reachable through delayed registrations, never the random pool.
    #[serde(default)]
    pub triggered_only: bool,
    #[serde(default)]
    pub condition: Option<EventCondition>,
    #[serde(skip)]
    pub trigger: Option<Predicate>,
    pub choices: Vec<EventChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventSource {
    Random,
    Scheduled,
    Storyline { storyline_id: String, stage: usize },
    Scandal { minister_id: String },
}

/// The one decision currently blocking the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub choices: Vec<EventChoice>,
    pub source: EventSource,
    pub fired_on: GameDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event_id: String,
    pub days_remaining: i64,
}

fn passes_gates(event: &EventDefinition, state: &GameState) -> bool {
    if event.chain_id.is_none() && state.events.has_fired(&event.id) {
        return false;
    }
    let condition_ok = event
        .condition
        .as_ref()
        .is_none_or(|c| evaluate_condition(c, state));
    let trigger_ok = event.trigger.as_ref().is_none_or(|t| t.test(state));
    condition_ok && trigger_ok
}

/// Events the random roll may draw from right now.
pub fn eligible_events<'a>(content: &'a ContentLibrary, state: &GameState) -> Vec<&'a EventDefinition> {
    content
        .events
        .iter()
        .filter(|e| !e.triggered_only && !content.is_stage_event(&e.id))
        .filter(|e| passes_gates(e, state))
        .collect()
}

/// Cumulative-weight draw; non-positive weights never win.
pub fn select_weighted<'a>(
    candidates: &[&'a EventDefinition],
    rng: &mut dyn RngCore,
) -> Option<&'a EventDefinition> {
    let total: f64 = candidates.iter().map(|e| e.weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let target = roll(rng) * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for event in candidates.iter().copied().filter(|e| e.weight > 0.0) {
        cumulative += event.weight;
        if target < cumulative {
            return Some(event);
        }
        last = Some(event);
    }
    last
}

pub fn fire_event(state: &mut GameState, event: &EventDefinition, source: EventSource) {
    let pending = PendingEvent {
        event_id: event.id.clone(),
        title: event.title.clone(),
        description: event.description.clone(),
        choices: event.choices.clone(),
        source,
        fired_on: state.time.date,
    };
    surface(state, pending);
}

fn surface(state: &mut GameState, pending: PendingEvent) {
    info!(event = %pending.event_id, date = %state.time.date, "event fired");
    state.events.history.push(pending.event_id.clone());
    state.log(LogCategory::Event, format!("Event: {}", pending.title));
    state.notify(NotificationKind::Info, pending.title.clone(), pending.description.clone());
    state.events.active_event = Some(pending);
}

/// Counts down delayed registrations and fires the first one that is due.
pub fn tick_scheduled(state: &mut GameState, content: &ContentLibrary) {
    for entry in &mut state.events.scheduled {
        entry.days_remaining -= 1;
    }
    if state.events.active_event.is_some() {
        return;
    }
    let Some(index) = state
        .events
        .scheduled
        .iter()
        .position(|e| e.days_remaining <= 0)
    else {
        return;
    };
    let due = state.events.scheduled.remove(index);
    match content.event(&due.event_id) {
        Some(event) => fire_event(state, event, EventSource::Scheduled),
        None => warn!(event = %due.event_id, "scheduled event missing from content, dropped"),
    }
}

pub const SCANDAL_COVER_UP_COST: f64 = 15.0;

fn scandal_event(state: &GameState, minister_id: &str, dismissal_factor: f64) -> Option<PendingEvent> {
    let minister = state
        .government
        .ministers
        .iter()
        .find(|m| m.id == minister_id)?;
    let charge = if minister.has_trait(MinisterTrait::Corrupt) {
        "embezzlement"
    } else {
        "gross mismanagement"
    };
    let choices = vec![
        EventChoice {
            label: format!("Dismiss {}", minister.name),
            consequences: Consequences {
                effects: StatDelta {
                    political_capital: -(minister.loyalty * dismissal_factor),
                    popularity: 2.0,
                    stability: -2.0,
                    ..Default::default()
                },
                dismiss_minister: Some(minister.id.clone()),
                ..Default::default()
            },
        },
        EventChoice {
            label: "Cover it up".to_string(),
            consequences: Consequences {
                effects: StatDelta {
                    political_capital: -SCANDAL_COVER_UP_COST,
                    stability: -1.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
        EventChoice {
            label: "Issue a public apology".to_string(),
            consequences: Consequences {
                effects: StatDelta {
                    popularity: -6.0,
                    stability: 1.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        },
    ];
    Some(PendingEvent {
        event_id: format!("scandal:{}", minister.id),
        title: format!("Scandal in the {:?} ministry", minister.ministry),
        description: format!("{} stands accused of {charge}.", minister.name),
        choices,
        source: EventSource::Scandal {
            minister_id: minister.id.clone(),
        },
        fired_on: state.time.date,
    })
}

/// Daily roll: a ministerial scandal first, then the declarative table.
pub fn roll_events(
    state: &mut GameState,
    content: &ContentLibrary,
    config: &SimulationConfig,
    rng: &mut dyn RngCore,
) {
    if state.events.active_event.is_some() {
        return;
    }

    let suspects: Vec<String> = state
        .government
        .ministers
        .iter()
        .filter(|m| m.traits.iter().any(|t| t.is_disqualifying()))
        .map(|m| m.id.clone())
        .collect();
    if !suspects.is_empty() && chance(rng, config.scandal_chance) {
        let target = &suspects[pick_index(rng, suspects.len())];
        if let Some(pending) = scandal_event(state, target, config.minister_dismissal_factor) {
            surface(state, pending);
            return;
        }
    }

    if !chance(rng, config.event_roll_chance) {
        return;
    }
    let candidates = eligible_events(content, state);
    debug!(eligible = candidates.len(), "event roll");
    if let Some(event) = select_weighted(&candidates, rng) {
        fire_event(state, event, EventSource::Random);
    }
}

pub fn apply_consequences(state: &mut GameState, consequences: &Consequences, source: &str) {
    consequences.effects.apply(state);
    for (name, value) in &consequences.story_vars {
        state.events.story_vars.insert(name.clone(), value.clone());
    }
    for effect in &consequences.approval {
        apply_approval_effect(state, effect, source);
    }
    if let Some(delayed) = &consequences.delayed {
        state.events.scheduled.push(ScheduledEvent {
            event_id: delayed.event_id.clone(),
            days_remaining: i64::from(delayed.delay_days),
        });
    }
    if let Some(kind) = consequences.start_situation {
        start_situation(state, kind);
    }
    if let Some(minister_id) = &consequences.dismiss_minister {
        dismiss_minister(state, minister_id);
    }
}

/// Applies the chosen option of the pending event and frees the clock.
pub fn resolve_active_event(
    state: &mut GameState,
    content: &ContentLibrary,
    choice: usize,
) -> Result<(), Rejection> {
    let pending = state
        .events
        .active_event
        .take()
        .ok_or(Rejection::NoActiveEvent)?;
    let Some(picked) = pending.choices.get(choice) else {
        let available = pending.choices.len();
        state.events.active_event = Some(pending);
        return Err(Rejection::InvalidChoice { choice, available });
    };

    info!(event = %pending.event_id, choice = %picked.label, "event resolved");
    state.log(
        LogCategory::Event,
        format!("{}: {}", pending.title, picked.label),
    );
    apply_consequences(state, &picked.consequences, &pending.event_id);

    if let EventSource::Storyline { storyline_id, stage } = &pending.source {
        storyline::on_stage_resolved(state, content, storyline_id, *stage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::testing::{self, ScriptedRng, fixture_content, fixture_state};
    use crate::simulation::{Action, NumericRange};

    fn event(id: &str, weight: f64) -> EventDefinition {
        EventDefinition {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            weight,
            chain_id: None,
            triggered_only: false,
            condition: None,
            trigger: None,
            choices: vec![EventChoice {
                label: "ok".into(),
                consequences: Consequences::default(),
            }],
        }
    }

    #[test]
    fn weighted_draw_walks_cumulative_weights() {
        let (a, b, c) = (event("a", 1.0), event("b", 1.0), event("c", 2.0));
        let pool = vec![&a, &b, &c];
        let mut rng = ScriptedRng::new(vec![0.1, 0.3, 0.5, 0.99]);
        let picks: Vec<_> = (0..4)
            .filter_map(|_| select_weighted(&pool, &mut rng))
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(picks, vec!["a", "b", "c", "c"]);
    }

    #[test]
    fn weightless_pool_yields_nothing() {
        let a = event("a", 0.0);
        let mut rng = ScriptedRng::new(vec![0.5]);
        assert!(select_weighted(&[&a], &mut rng).is_none());
        assert!(select_weighted(&[], &mut rng).is_none());
    }

    #[test]
    fn fired_events_leave_the_pool_unless_chained() {
        let mut content = ContentLibrary::default();
        let mut chained = event("chained", 1.0);
        chained.chain_id = Some("chain".into());
        content.events = vec![event("once", 1.0), chained];
        let mut state = GameState::default();
        state.events.history = vec!["once".into(), "chained".into()];
        let ids: Vec<_> = eligible_events(&content, &state)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["chained"]);
    }

    #[test]
    fn condition_and_trigger_must_both_pass() {
        let mut content = ContentLibrary::default();
        let mut gated = event("gated", 1.0);
        gated.condition = Some(EventCondition {
            stability: Some(NumericRange::at_most(40.0)),
            ..Default::default()
        });
        gated.trigger = Some(Predicate::new(|s| s.resources.budget < 0.0));
        content.events = vec![gated];

        let mut state = GameState::default();
        state.resources.stability = 30.0;
        assert!(eligible_events(&content, &state).is_empty());
        state.resources.budget = -5.0;
        assert_eq!(eligible_events(&content, &state).len(), 1);
        state.resources.stability = 60.0;
        assert!(eligible_events(&content, &state).is_empty());
    }

    #[test]
    fn delayed_events_fire_first_ready_only() {
        let content = fixture_content();
        let mut state = fixture_state();
        state.events.scheduled = vec![
            ScheduledEvent {
                event_id: "union_ultimatum".into(),
                days_remaining: 1,
            },
            ScheduledEvent {
                event_id: "budget_leak".into(),
                days_remaining: 1,
            },
        ];
        tick_scheduled(&mut state, &content);
        assert_eq!(
            state.events.active_event.as_ref().map(|e| e.event_id.as_str()),
            Some("union_ultimatum")
        );
        assert_eq!(state.events.scheduled.len(), 1);
        assert_eq!(state.events.scheduled[0].days_remaining, 0);
    }

    #[test]
    fn resolving_applies_consequences_and_clears_the_slot() {
        let content = fixture_content();
        let mut state = fixture_state();
        let event = content.event("budget_leak").expect("fixture event");
        fire_event(&mut state, event, EventSource::Random);
        let budget = state.resources.budget;

        assert_eq!(
            resolve_active_event(&mut state, &content, 9),
            Err(Rejection::InvalidChoice {
                choice: 9,
                available: 2
            })
        );
        assert!(state.events.active_event.is_some());

        resolve_active_event(&mut state, &content, 0).expect("valid choice");
        assert!(state.events.active_event.is_none());
        assert!(state.resources.budget < budget);
        assert_eq!(
            state.events.story_vars.get("leak_handled"),
            Some(&StoryValue::Flag(true))
        );
        assert_eq!(
            resolve_active_event(&mut state, &content, 0),
            Err(Rejection::NoActiveEvent)
        );
    }

    #[test]
    fn scandal_targets_a_disqualified_minister() {
        let content = ContentLibrary::default();
        let mut state = fixture_state();
        let config = SimulationConfig::default();
        // scandal roll, suspect pick
        let mut rng = ScriptedRng::new(vec![0.05, 0.0]);
        roll_events(&mut state, &content, &config, &mut rng);
        let pending = state.events.active_event.as_ref().expect("scandal fired");
        assert!(matches!(pending.source, EventSource::Scandal { .. }));
        assert_eq!(pending.choices.len(), 3);
    }

    #[test]
    fn dismissing_in_a_scandal_removes_the_minister() {
        let content = ContentLibrary::default();
        let mut state = fixture_state();
        let config = SimulationConfig::default();
        let mut rng = ScriptedRng::new(vec![0.05, 0.0]);
        roll_events(&mut state, &content, &config, &mut rng);
        let EventSource::Scandal { minister_id } = state
            .events
            .active_event
            .as_ref()
            .map(|e| e.source.clone())
            .expect("scandal fired")
        else {
            panic!("expected a scandal");
        };
        resolve_active_event(&mut state, &content, 0).expect("dismiss");
        assert!(state.government.ministers.iter().all(|m| m.id != minister_id));
    }

    #[test]
    fn a_delayed_follow_up_fires_after_its_countdown() {
        let mut sim = testing::fixture_simulation(vec![0.99]);
        let mut state = fixture_state();
        let leak = sim.content().event("budget_leak").cloned().expect("fixture event");
        fire_event(&mut state, &leak, EventSource::Random);

        state = sim.dispatch(&state, Action::ResolveEvent { choice: 1 });
        assert_eq!(
            state.events.scheduled,
            vec![ScheduledEvent {
                event_id: "union_ultimatum".into(),
                days_remaining: 3,
            }]
        );

        for _ in 0..2 {
            state = sim.dispatch(&state, Action::AdvanceDay);
            assert!(state.events.active_event.is_none());
        }
        state = sim.dispatch(&state, Action::AdvanceDay);
        let pending = state.events.active_event.as_ref().expect("follow-up fired");
        assert_eq!(pending.event_id, "union_ultimatum");
        assert_eq!(pending.source, EventSource::Scheduled);
        assert!(state.events.scheduled.is_empty());
    }
}
