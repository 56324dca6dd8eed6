//! Interest groups, protests, media and the election campaign.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::simulation::dice::chance;
use crate::simulation::{
    ApprovalEffect, Campaign, GameDate, GameState, GroupKind, InterestGroup, LogCategory,
    NotificationKind, Protest, Rejection, clamp_percent, ensure_budget, ensure_capital,
    record_human_rights_incident,
};

pub const NEGOTIATE_CAPITAL_COST: f64 = 20.0;
pub const SUPPRESS_CAPITAL_COST: f64 = 30.0;
pub const ESCALATION_CHANCE: f64 = 0.3;
pub const IGNORE_ESCALATION_CHANCE: f64 = 0.4;
pub const RALLY_MIN_BUDGET: f64 = 0.5;
pub const SMEAR_BUDGET_COST: f64 = 1.0;
pub const SMEAR_CAPITAL_COST: f64 = 25.0;
pub const SMEAR_BACKFIRE_CHANCE: f64 = 0.3;

/// A temporary approval shift that is reverted when it runs out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalModifier {
    pub group: GroupKind,
    /// What actually landed after clamping; this is what gets reverted.
    pub amount: f64,
    pub months_remaining: u32,
    pub source: String,
}

pub fn apply_approval_effect(state: &mut GameState, effect: &ApprovalEffect, source: &str) {
    let landed = state.social.adjust_approval(effect.group, effect.amount);
    if effect.duration_months > 0 && landed != 0.0 {
        state.social.approval_modifiers.push(ApprovalModifier {
            group: effect.group,
            amount: landed,
            months_remaining: effect.duration_months,
            source: source.to_string(),
        });
    }
}

/// Counts modifiers down by a month and reverts the ones that ran out.
pub fn expire_approval_modifiers(state: &mut GameState) {
    let mut expired = Vec::new();
    state.social.approval_modifiers.retain_mut(|modifier| {
        modifier.months_remaining = modifier.months_remaining.saturating_sub(1);
        if modifier.months_remaining == 0 {
            expired.push((modifier.group, modifier.amount));
            false
        } else {
            true
        }
    });
    for (group, amount) in expired {
        state.social.adjust_approval(group, -amount);
    }
}

/// Population-weighted mean approval; 50 when nobody is counted.
pub fn weighted_popularity(groups: &[InterestGroup]) -> f64 {
    let population: f64 = groups.iter().map(|g| g.population_size.max(0.0)).sum();
    if population <= 0.0 {
        return 50.0;
    }
    groups
        .iter()
        .map(|g| g.approval * g.population_size.max(0.0))
        .sum::<f64>()
        / population
}

pub fn social_tension(state: &GameState) -> f64 {
    let unrest: f64 = state
        .social
        .active_protests
        .values()
        .map(|p| p.intensity / 10.0)
        .sum();
    clamp_percent(100.0 - weighted_popularity(&state.social.interest_groups) + unrest)
}

/// Base monthly chance that a group with this approval takes to the streets.
pub fn ignition_probability(approval: f64) -> f64 {
    if approval < 20.0 {
        0.8
    } else if approval < 30.0 {
        0.4
    } else if approval < 40.0 {
        0.1
    } else {
        0.0
    }
}

pub fn create_protest(group: &InterestGroup, date: GameDate) -> Protest {
    let intensity = (100.0 - group.approval).max(30.0).min(100.0);
    Protest {
        group: group.kind,
        intensity,
        participants: group.population_size * intensity / 200.0,
        duration: 0,
        escalating: false,
        started_on: date,
    }
}

/// Monthly roll for new protests; groups already protesting are skipped.
pub fn ignite_protests(state: &mut GameState, rng: &mut dyn RngCore) {
    let mut started = Vec::new();
    for group in &state.social.interest_groups {
        if state.social.active_protests.contains_key(&group.kind) {
            continue;
        }
        let p = ignition_probability(group.approval) * group.power.clamp(0.0, 100.0) / 100.0;
        if p > 0.0 && chance(rng, p) {
            started.push(create_protest(group, state.time.date));
        }
    }
    for protest in started {
        info!(group = ?protest.group, intensity = protest.intensity, "protest started");
        state.log(
            LogCategory::Social,
            format!("{:?} have taken to the streets", protest.group),
        );
        state.notify(
            NotificationKind::Warning,
            "Protest",
            format!("{:?} are protesting", protest.group),
        );
        state.social.active_protests.insert(protest.group, protest);
    }
}

/// Daily protest evolution; protests whose intensity is spent disappear.
pub fn update_protests(state: &mut GameState, rng: &mut dyn RngCore) {
    let mut protests = std::mem::take(&mut state.social.active_protests);
    for protest in protests.values_mut() {
        let Some(group) = state.social.group(protest.group) else {
            protest.intensity = 0.0;
            continue;
        };
        let approval = group.approval;
        protest.duration += 1;
        if !protest.escalating
            && protest.duration > 2
            && approval < 25.0
            && chance(rng, ESCALATION_CHANCE)
        {
            debug!(group = ?protest.group, "protest escalating");
            protest.escalating = true;
        }
        if protest.escalating {
            protest.intensity = (protest.intensity + 10.0).min(100.0);
        }
        if approval > 60.0 {
            protest.escalating = false;
            protest.intensity = (protest.intensity - 20.0).max(0.0);
        }
        protest.participants = group.population_size * protest.intensity / 200.0;
    }
    protests.retain(|_, p| p.intensity > 0.0);
    let unrest: f64 = protests.values().map(|p| p.intensity).sum();
    state.adjust_stability(-unrest * 0.002);
    state.social.active_protests = protests;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtestAction {
    Negotiate,
    Suppress,
    Concede,
    Ignore,
}

/// Outcome of a player response to a protest, before it is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProtestResolution {
    pub protest_ended: bool,
    pub approval_change: f64,
    pub stability_change: f64,
    pub budget_cost: f64,
    pub capital_cost: f64,
    pub escalated: bool,
    pub human_rights_damage: bool,
    pub message: String,
}

pub fn resolve_protest_action(
    protest: &Protest,
    action: ProtestAction,
    group: &InterestGroup,
    budget: f64,
    political_capital: f64,
    rng: &mut dyn RngCore,
) -> Result<ProtestResolution, Rejection> {
    let resolution = match action {
        ProtestAction::Negotiate => {
            if political_capital < NEGOTIATE_CAPITAL_COST {
                return Err(Rejection::InsufficientCapital {
                    needed: NEGOTIATE_CAPITAL_COST,
                    available: political_capital,
                });
            }
            if chance(rng, 0.6 + group.approval / 200.0) {
                ProtestResolution {
                    protest_ended: true,
                    approval_change: 15.0,
                    stability_change: 5.0,
                    capital_cost: NEGOTIATE_CAPITAL_COST,
                    message: "Negotiations succeeded; the protesters went home".into(),
                    ..Default::default()
                }
            } else {
                ProtestResolution {
                    approval_change: -5.0,
                    capital_cost: NEGOTIATE_CAPITAL_COST,
                    message: "Negotiations broke down".into(),
                    ..Default::default()
                }
            }
        }
        ProtestAction::Suppress => {
            if political_capital < SUPPRESS_CAPITAL_COST {
                return Err(Rejection::InsufficientCapital {
                    needed: SUPPRESS_CAPITAL_COST,
                    available: political_capital,
                });
            }
            ProtestResolution {
                protest_ended: true,
                approval_change: -25.0,
                stability_change: -10.0,
                capital_cost: SUPPRESS_CAPITAL_COST,
                human_rights_damage: true,
                message: "Security forces dispersed the crowd".into(),
                ..Default::default()
            }
        }
        ProtestAction::Concede => {
            let cost = protest.intensity / 10.0;
            if budget < cost {
                return Err(Rejection::InsufficientBudget {
                    needed: cost,
                    available: budget,
                });
            }
            ProtestResolution {
                protest_ended: true,
                approval_change: 30.0,
                stability_change: 3.0,
                budget_cost: cost,
                message: "The government met the protesters' demands".into(),
                ..Default::default()
            }
        }
        ProtestAction::Ignore => {
            if chance(rng, IGNORE_ESCALATION_CHANCE) {
                ProtestResolution {
                    approval_change: -10.0,
                    stability_change: -5.0,
                    escalated: true,
                    message: "Ignored, the protest grew angrier".into(),
                    ..Default::default()
                }
            } else {
                ProtestResolution {
                    approval_change: -3.0,
                    stability_change: -1.0,
                    message: "The protest carries on".into(),
                    ..Default::default()
                }
            }
        }
    };
    Ok(resolution)
}

pub fn apply_protest_resolution(
    state: &mut GameState,
    group: GroupKind,
    resolution: &ProtestResolution,
) {
    state.social.adjust_approval(group, resolution.approval_change);
    state.adjust_stability(resolution.stability_change);
    state.adjust_budget(-resolution.budget_cost);
    state.adjust_political_capital(-resolution.capital_cost);
    if resolution.protest_ended {
        state.social.active_protests.remove(&group);
    } else if resolution.escalated {
        if let Some(protest) = state.social.active_protests.get_mut(&group) {
            protest.escalating = true;
            protest.intensity = (protest.intensity + 10.0).min(100.0);
        }
    }
    if resolution.human_rights_damage {
        record_human_rights_incident(state);
    }
    state.log(
        LogCategory::Social,
        format!("{group:?} protest: {}", resolution.message),
    );
}

/// Looks up the protest and its group, rolls the outcome and applies it.
pub fn handle_protest(
    state: &mut GameState,
    group: GroupKind,
    action: ProtestAction,
    rng: &mut dyn RngCore,
) -> Result<ProtestResolution, Rejection> {
    let protest = state
        .social
        .active_protests
        .get(&group)
        .ok_or_else(|| Rejection::unknown("protest", format!("{group:?}")))?;
    let interest = state
        .social
        .group(group)
        .ok_or_else(|| Rejection::unknown("interest group", format!("{group:?}")))?;
    let resolution = resolve_protest_action(
        protest,
        action,
        interest,
        state.resources.budget,
        state.resources.political_capital,
        rng,
    )?;
    apply_protest_resolution(state, group, &resolution);
    Ok(resolution)
}

/// Monthly approval drift toward how well policy matches each group's preferences.
pub fn drift_group_approval(state: &mut GameState) {
    let tax = state.policies.tax_rate;
    let share = state.spending_share();
    let unemployment = state.stats.unemployment;
    for group in &mut state.social.interest_groups {
        let mut target = 70.0
            - (tax - group.preferred_tax_rate).abs() * 150.0
            - (share - group.preferred_spending_share).abs() * 100.0;
        if matches!(group.kind, GroupKind::Workers | GroupKind::Youth) {
            target -= (unemployment - 0.05).max(0.0) * 200.0;
        }
        group.approval = clamp_percent(group.approval + (clamp_percent(target) - group.approval) * 0.1);
    }
}

pub fn censor_media(state: &mut GameState) {
    state.social.adjust_censorship(15.0);
    state.social.adjust_media_freedom(-20.0);
    state.social.adjust_media_support(10.0);
    state.log(LogCategory::Social, "Press restrictions tightened");
}

pub fn fund_public_media(state: &mut GameState, amount: f64) -> Result<(), Rejection> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Rejection::precondition("funding must be a positive amount"));
    }
    ensure_budget(state, amount)?;
    state.adjust_budget(-amount);
    state.social.adjust_media_support((amount * 10.0).min(15.0));
    state.log(
        LogCategory::Social,
        format!("Public broadcasters funded with {amount:.1}B"),
    );
    Ok(())
}

/// Monthly: support relaxes toward neutral, censorship eases, heavy censorship alienates the young.
pub fn media_drift(state: &mut GameState) {
    let support = state.social.media.support;
    state.social.adjust_media_support((50.0 - support) * 0.1);
    state.adjust_popularity((support - 50.0) * 0.02);
    if state.social.media.censorship > 50.0 {
        state.social.adjust_approval(GroupKind::Youth, -2.0);
    }
    state.social.adjust_censorship(-1.0);
}

pub fn start_campaign(state: &mut GameState) -> Result<(), Rejection> {
    if state.social.campaign.is_some() {
        return Err(Rejection::precondition("a campaign is already running"));
    }
    state.social.campaign = Some(Campaign {
        momentum: 10.0,
        opposition_strength: 50.0,
        rallies_held: 0,
        started_on: state.time.date,
    });
    state.log(LogCategory::Politics, "Campaign launched");
    Ok(())
}

pub fn hold_rally(state: &mut GameState, budget: f64) -> Result<f64, Rejection> {
    if state.social.campaign.is_none() {
        return Err(Rejection::precondition("no campaign is running"));
    }
    if !budget.is_finite() || budget < RALLY_MIN_BUDGET {
        return Err(Rejection::precondition(format!(
            "a rally needs at least {RALLY_MIN_BUDGET}B"
        )));
    }
    ensure_budget(state, budget)?;
    let boost = (budget * 5.0).min(10.0);
    state.adjust_budget(-budget);
    state.adjust_popularity(boost);
    if let Some(campaign) = state.social.campaign.as_mut() {
        campaign.momentum = clamp_percent(campaign.momentum + 5.0);
        campaign.rallies_held += 1;
    }
    state.log(
        LogCategory::Politics,
        format!("Rally held, popularity {boost:+.1}"),
    );
    Ok(boost)
}

/// Returns whether the smear backfired.
pub fn smear_campaign(state: &mut GameState, rng: &mut dyn RngCore) -> Result<bool, Rejection> {
    if state.social.campaign.is_none() {
        return Err(Rejection::precondition("no campaign is running"));
    }
    ensure_budget(state, SMEAR_BUDGET_COST)?;
    ensure_capital(state, SMEAR_CAPITAL_COST)?;
    state.adjust_budget(-SMEAR_BUDGET_COST);
    state.adjust_political_capital(-SMEAR_CAPITAL_COST);

    let backfired = chance(rng, SMEAR_BACKFIRE_CHANCE);
    if backfired {
        state.adjust_popularity(-15.0);
        state.log(LogCategory::Politics, "Smear campaign backfired");
        state.notify(
            NotificationKind::Danger,
            "Smear exposed",
            "The press traced the smear back to us.",
        );
    } else if let Some(campaign) = state.social.campaign.as_mut() {
        campaign.opposition_strength = clamp_percent(campaign.opposition_strength - 15.0);
        campaign.momentum = clamp_percent(campaign.momentum + 10.0);
        state.log(LogCategory::Politics, "Smear campaign hurt the opposition");
    }
    Ok(backfired)
}

/// Monthly: momentum fades and lends popularity while it lasts.
pub fn campaign_drift(state: &mut GameState) {
    let Some(campaign) = state.social.campaign.as_mut() else {
        return;
    };
    campaign.momentum = clamp_percent(campaign.momentum * 0.9);
    let lift = campaign.momentum * 0.05;
    state.adjust_popularity(lift);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::testing::ScriptedRng;
    use proptest::prelude::*;

    fn workers(approval: f64) -> InterestGroup {
        InterestGroup {
            approval,
            ..InterestGroup::baseline(GroupKind::Workers)
        }
    }

    fn state_with_protest(approval: f64) -> GameState {
        let mut state = GameState::default();
        state.social.interest_groups = GroupKind::ALL.iter().map(|k| InterestGroup::baseline(*k)).collect();
        state.social.interest_groups[0].approval = approval;
        let protest = create_protest(&state.social.interest_groups[0], state.time.date);
        state.social.active_protests.insert(GroupKind::Workers, protest);
        state
    }

    #[test]
    fn new_protests_follow_approval() {
        let protest = create_protest(&workers(10.0), GameDate::default());
        assert_eq!(protest.intensity, 90.0);
        assert_eq!(protest.participants, 4.0 * 90.0 / 200.0);
        let mild = create_protest(&workers(85.0), GameDate::default());
        assert_eq!(mild.intensity, 30.0);
    }

    #[test]
    fn ignition_bands() {
        assert_eq!(ignition_probability(10.0), 0.8);
        assert_eq!(ignition_probability(25.0), 0.4);
        assert_eq!(ignition_probability(35.0), 0.1);
        assert_eq!(ignition_probability(40.0), 0.0);
    }

    #[test]
    fn ignition_is_scaled_by_power_and_unique_per_group() {
        let mut state = GameState::default();
        state.social.interest_groups = vec![workers(10.0)];
        // 0.8 * 0.6 = 0.48
        let mut rng = ScriptedRng::new(vec![0.5]);
        ignite_protests(&mut state, &mut rng);
        assert!(state.social.active_protests.is_empty());
        let mut rng = ScriptedRng::new(vec![0.4]);
        ignite_protests(&mut state, &mut rng);
        ignite_protests(&mut state, &mut rng);
        assert_eq!(state.social.active_protests.len(), 1);
    }

    #[test]
    fn angry_protests_escalate_and_calm_ones_fade() {
        let mut state = state_with_protest(10.0);
        let mut rng = ScriptedRng::new(vec![0.1]);
        for _ in 0..3 {
            update_protests(&mut state, &mut rng);
        }
        let protest = &state.social.active_protests[&GroupKind::Workers];
        assert!(protest.escalating);
        assert_eq!(protest.intensity, 100.0);

        state.social.interest_groups[0].approval = 70.0;
        for _ in 0..5 {
            update_protests(&mut state, &mut rng);
        }
        assert!(state.social.active_protests.is_empty());
    }

    #[test]
    fn suppress_and_concede_always_end_the_protest() {
        let mut rng = ScriptedRng::new(vec![0.99]);
        for action in [ProtestAction::Suppress, ProtestAction::Concede] {
            let mut state = state_with_protest(20.0);
            state.resources.budget = 50.0;
            let resolution =
                handle_protest(&mut state, GroupKind::Workers, action, &mut rng).expect("resolved");
            assert!(resolution.protest_ended);
            assert!(state.social.active_protests.is_empty());
        }
    }

    #[test]
    fn suppression_damages_human_rights() {
        let mut state = state_with_protest(20.0);
        state.diplomacy.countries.push(crate::simulation::Country {
            id: "n".into(),
            name: "Neighbour".into(),
            relation: 50.0,
            influence: 0.0,
            trade_agreement: false,
            defense_pact: false,
        });
        let mut rng = ScriptedRng::new(vec![]);
        handle_protest(&mut state, GroupKind::Workers, ProtestAction::Suppress, &mut rng)
            .expect("suppressed");
        assert_eq!(state.diplomacy.human_rights_incidents, 1);
        assert_eq!(state.diplomacy.countries[0].relation, 47.0);
        assert_eq!(state.resources.political_capital, 20.0);
    }

    #[test]
    fn negotiation_outcomes() {
        let protest = create_protest(&workers(20.0), GameDate::default());
        let group = workers(20.0);
        // success threshold 0.6 + 0.1
        let mut rng = ScriptedRng::new(vec![0.69, 0.71]);
        let won = resolve_protest_action(&protest, ProtestAction::Negotiate, &group, 0.0, 50.0, &mut rng)
            .expect("affordable");
        assert!(won.protest_ended);
        let lost = resolve_protest_action(&protest, ProtestAction::Negotiate, &group, 0.0, 50.0, &mut rng)
            .expect("affordable");
        assert!(!lost.protest_ended);
        assert_eq!(lost.capital_cost, NEGOTIATE_CAPITAL_COST);
        assert!(matches!(
            resolve_protest_action(&protest, ProtestAction::Negotiate, &group, 0.0, 5.0, &mut rng),
            Err(Rejection::InsufficientCapital { .. })
        ));
    }

    #[test]
    fn concession_needs_the_budget() {
        let protest = create_protest(&workers(20.0), GameDate::default());
        let mut rng = ScriptedRng::new(vec![]);
        assert!(matches!(
            resolve_protest_action(&protest, ProtestAction::Concede, &workers(20.0), 7.0, 0.0, &mut rng),
            Err(Rejection::InsufficientBudget { .. })
        ));
    }

    #[test]
    fn approval_modifiers_revert_what_landed() {
        let mut state = GameState::default();
        state.social.interest_groups = vec![workers(95.0)];
        let effect = ApprovalEffect {
            group: GroupKind::Workers,
            amount: 10.0,
            duration_months: 2,
        };
        apply_approval_effect(&mut state, &effect, "test");
        assert_eq!(state.social.interest_groups[0].approval, 100.0);
        expire_approval_modifiers(&mut state);
        assert_eq!(state.social.approval_modifiers.len(), 1);
        expire_approval_modifiers(&mut state);
        assert!(state.social.approval_modifiers.is_empty());
        assert_eq!(state.social.interest_groups[0].approval, 95.0);
    }

    #[test]
    fn rallies_need_a_campaign_and_cash() {
        let mut state = GameState::default();
        state.resources.budget = 3.0;
        assert!(hold_rally(&mut state, 1.0).is_err());
        start_campaign(&mut state).expect("campaign");
        assert!(start_campaign(&mut state).is_err());
        assert!(matches!(hold_rally(&mut state, 0.2), Err(Rejection::Precondition(_))));
        assert_eq!(hold_rally(&mut state, 3.0), Ok(10.0));
        assert_eq!(state.stats.popularity, 60.0);
        assert_eq!(state.social.campaign.as_ref().map(|c| c.momentum), Some(15.0));
    }

    #[test]
    fn smear_can_backfire() {
        let mut state = GameState::default();
        state.resources.budget = 5.0;
        state.resources.political_capital = 30.0;
        start_campaign(&mut state).expect("campaign");
        let mut rng = ScriptedRng::new(vec![0.1, 0.9]);
        assert_eq!(smear_campaign(&mut state, &mut rng), Ok(true));
        assert_eq!(state.stats.popularity, 35.0);
        assert_eq!(smear_campaign(&mut state, &mut rng), Err(Rejection::InsufficientCapital {
            needed: SMEAR_CAPITAL_COST,
            available: 5.0,
        }));
    }

    #[test]
    fn weighted_popularity_counts_heads() {
        let groups = vec![
            InterestGroup { approval: 80.0, population_size: 3.0, ..InterestGroup::baseline(GroupKind::Workers) },
            InterestGroup { approval: 20.0, population_size: 1.0, ..InterestGroup::baseline(GroupKind::Business) },
        ];
        assert_eq!(weighted_popularity(&groups), 65.0);
        assert_eq!(weighted_popularity(&[]), 50.0);
    }

    proptest! {
        #[test]
        fn ignore_never_costs_resources(roll in 0.0..1.0f64, intensity in 1.0..100.0f64) {
            let mut protest = create_protest(&workers(30.0), GameDate::default());
            protest.intensity = intensity;
            let mut rng = ScriptedRng::new(vec![roll]);
            let outcome = resolve_protest_action(&protest, ProtestAction::Ignore, &workers(30.0), 0.0, 0.0, &mut rng)
                .expect("ignore is always allowed");
            prop_assert_eq!(outcome.budget_cost, 0.0);
            prop_assert_eq!(outcome.capital_cost, 0.0);
            prop_assert!(!outcome.protest_ended);
        }

        #[test]
        fn tension_stays_in_range(approvals in proptest::collection::vec(0.0..=100.0f64, 6), intensity in 0.0..=100.0f64) {
            let mut state = GameState::default();
            state.social.interest_groups = GroupKind::ALL
                .iter()
                .zip(approvals)
                .map(|(k, a)| InterestGroup { approval: a, ..InterestGroup::baseline(*k) })
                .collect();
            for kind in GroupKind::ALL {
                let mut p = create_protest(&InterestGroup::baseline(kind), GameDate::default());
                p.intensity = intensity;
                state.social.active_protests.insert(kind, p);
            }
            let t = social_tension(&state);
            prop_assert!((0.0..=100.0).contains(&t));
        }
    }

    #[test]
    fn non_finite_spending_is_refused() {
        let mut state = crate::simulation::testing::fixture_state();
        let before = state.clone();
        for amount in [f64::NAN, f64::INFINITY, 0.0] {
            assert!(matches!(
                fund_public_media(&mut state, amount),
                Err(Rejection::Precondition(_))
            ));
        }
        assert_eq!(state, before);

        start_campaign(&mut state).expect("campaign starts");
        let campaigning = state.clone();
        for budget in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                hold_rally(&mut state, budget),
                Err(Rejection::Precondition(_))
            ));
        }
        assert_eq!(state, campaigning);
        assert!(state.resources.budget.is_finite());
    }
}
