//! Declarative conditions over the game state.
//!
//! A condition is a bag of independent checks; every check that is present
//! must pass. The `custom` predicate is the one escape hatch for rules the
//! named checks cannot express.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::simulation::{GameState, MinisterTrait, social_tension};

/// Story variables are loosely typed: flags, numbers or short strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl StoryValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StoryValue::Number(n) => Some(*n),
            StoryValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            StoryValue::Text(_) => None,
        }
    }
}

/// Inclusive numeric bounds; a missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Requirement on one story variable: equality, a numeric range, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VarRequirement {
    pub equals: Option<StoryValue>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl VarRequirement {
    pub fn matches(&self, value: Option<&StoryValue>) -> bool {
        if let Some(expected) = &self.equals {
            if value != Some(expected) {
                return false;
            }
        }
        if self.min.is_some() || self.max.is_some() {
            let range = NumericRange {
                min: self.min,
                max: self.max,
            };
            return value
                .and_then(StoryValue::as_number)
                .is_some_and(|n| range.contains(n));
        }
        true
    }
}

/// Opaque state predicate supplied by content code.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&GameState) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&GameState) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn test(&self, state: &GameState) -> bool {
        (self.0)(state)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EventCondition {
    pub gdp: Option<NumericRange>,
    pub unemployment: Option<NumericRange>,
    pub inflation: Option<NumericRange>,
    pub popularity: Option<NumericRange>,
    pub stability: Option<NumericRange>,
    /// Some sitting minister carries this trait.
    pub minister_trait: Option<MinisterTrait>,
    /// Whether any protest is (or is not) under way.
    pub protest_active: Option<bool>,
    pub min_social_tension: Option<f64>,
    pub story_vars: BTreeMap<String, StoryValue>,
    /// Every listed event must already have fired.
    pub requires_events: Vec<String>,
    /// None of the listed events may have fired.
    pub excludes_events: Vec<String>,
    pub min_months_elapsed: Option<u32>,
    #[serde(skip)]
    pub custom: Option<Predicate>,
}

pub fn evaluate_condition(condition: &EventCondition, state: &GameState) -> bool {
    let ranges = [
        (&condition.gdp, state.stats.gdp),
        (&condition.unemployment, state.stats.unemployment),
        (&condition.inflation, state.stats.inflation),
        (&condition.popularity, state.stats.popularity),
        (&condition.stability, state.resources.stability),
    ];
    if ranges
        .iter()
        .any(|(range, value)| range.is_some_and(|r| !r.contains(*value)))
    {
        return false;
    }

    if let Some(t) = condition.minister_trait {
        if !state.government.ministers.iter().any(|m| m.has_trait(t)) {
            return false;
        }
    }

    if let Some(wanted) = condition.protest_active {
        if state.social.active_protests.is_empty() == wanted {
            return false;
        }
    }

    if let Some(threshold) = condition.min_social_tension {
        if social_tension(state) < threshold {
            return false;
        }
    }

    let vars = &state.events.story_vars;
    if condition
        .story_vars
        .iter()
        .any(|(name, expected)| vars.get(name) != Some(expected))
    {
        return false;
    }

    if !condition
        .requires_events
        .iter()
        .all(|id| state.events.has_fired(id))
    {
        return false;
    }
    if condition
        .excludes_events
        .iter()
        .any(|id| state.events.has_fired(id))
    {
        return false;
    }

    if let Some(months) = condition.min_months_elapsed {
        if state.months_elapsed() < months {
            return false;
        }
    }

    condition.custom.as_ref().is_none_or(|p| p.test(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{GameDate, GroupKind, Ministry, Minister, Protest};

    fn state() -> GameState {
        GameState::default()
    }

    #[test]
    fn empty_condition_passes() {
        assert!(evaluate_condition(&EventCondition::default(), &state()));
    }

    #[test]
    fn range_checks_are_inclusive() {
        let mut s = state();
        s.stats.inflation = 0.15;
        let cond = EventCondition {
            inflation: Some(NumericRange::at_least(0.15)),
            ..Default::default()
        };
        assert!(evaluate_condition(&cond, &s));
        s.stats.inflation = 0.149;
        assert!(!evaluate_condition(&cond, &s));
    }

    #[test]
    fn minister_trait_and_protest_flags() {
        let mut s = state();
        let cond = EventCondition {
            minister_trait: Some(MinisterTrait::Corrupt),
            protest_active: Some(true),
            ..Default::default()
        };
        assert!(!evaluate_condition(&cond, &s));

        s.government.ministers.push(Minister {
            id: "m1".into(),
            name: "Greed".into(),
            ministry: Ministry::Finance,
            loyalty: 50.0,
            competence: 40.0,
            traits: vec![MinisterTrait::Corrupt],
        });
        assert!(!evaluate_condition(&cond, &s));

        s.social.active_protests.insert(
            GroupKind::Workers,
            Protest {
                group: GroupKind::Workers,
                intensity: 40.0,
                participants: 10.0,
                duration: 0,
                escalating: false,
                started_on: GameDate::default(),
            },
        );
        assert!(evaluate_condition(&cond, &s));
    }

    #[test]
    fn history_inclusion_and_exclusion() {
        let mut s = state();
        let cond = EventCondition {
            requires_events: vec!["a".into()],
            excludes_events: vec!["b".into()],
            ..Default::default()
        };
        assert!(!evaluate_condition(&cond, &s));
        s.events.history.push("a".into());
        assert!(evaluate_condition(&cond, &s));
        s.events.history.push("b".into());
        assert!(!evaluate_condition(&cond, &s));
    }

    #[test]
    fn story_variables_and_elapsed_months() {
        let mut s = state();
        let cond = EventCondition {
            story_vars: BTreeMap::from([("deal".to_string(), StoryValue::Flag(true))]),
            min_months_elapsed: Some(2),
            ..Default::default()
        };
        s.events
            .story_vars
            .insert("deal".into(), StoryValue::Flag(true));
        assert!(!evaluate_condition(&cond, &s));
        s.time.date = GameDate::new(2024, 3, 1);
        assert!(evaluate_condition(&cond, &s));
    }

    #[test]
    fn custom_predicate_is_the_last_word() {
        let cond = EventCondition {
            custom: Some(Predicate::new(|s| s.resources.budget > 10.0)),
            ..Default::default()
        };
        let mut s = state();
        assert!(!evaluate_condition(&cond, &s));
        s.resources.budget = 11.0;
        assert!(evaluate_condition(&cond, &s));
    }

    #[test]
    fn var_requirement_ranges() {
        let req = VarRequirement {
            min: Some(2.0),
            ..Default::default()
        };
        assert!(req.matches(Some(&StoryValue::Number(3.0))));
        assert!(!req.matches(Some(&StoryValue::Number(1.0))));
        assert!(!req.matches(None));
        let eq = VarRequirement {
            equals: Some(StoryValue::Text("mediator".into())),
            ..Default::default()
        };
        assert!(eq.matches(Some(&StoryValue::Text("mediator".into()))));
        assert!(!eq.matches(Some(&StoryValue::Text("hardliner".into()))));
    }

    #[test]
    fn condition_parses_from_json() {
        let cond: EventCondition = serde_json::from_str(
            r#"{ "stability": { "max": 40 }, "story_vars": { "union_deal": true } }"#,
        )
        .expect("valid condition");
        assert_eq!(cond.stability, Some(NumericRange::at_most(40.0)));
        assert_eq!(cond.story_vars.get("union_deal"), Some(&StoryValue::Flag(true)));
    }
}
