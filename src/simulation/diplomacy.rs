//! Relations with other countries.

use tracing::info;

use crate::simulation::{
    DiplomaticAction, GameState, LogCategory, Rejection, SimulationConfig, clamp_percent,
    ensure_budget, ensure_capital,
};

pub const TRADE_RELATION_FLOOR: f64 = 60.0;
pub const DEFENSE_RELATION_FLOOR: f64 = 75.0;
pub const RELATION_DRIFT: f64 = 0.02;
pub const INFLUENCE_DECAY: f64 = 0.95;
pub const HUMAN_RIGHTS_PENALTY: f64 = 3.0;

pub fn apply_diplomatic_action(
    state: &mut GameState,
    country_id: &str,
    action: DiplomaticAction,
    config: &SimulationConfig,
) -> Result<(), Rejection> {
    let index = state
        .diplomacy
        .countries
        .iter()
        .position(|c| c.id == country_id)
        .ok_or_else(|| Rejection::unknown("country", country_id))?;

    let country = &state.diplomacy.countries[index];
    match action {
        DiplomaticAction::ImproveRelations => {
            ensure_budget(state, config.improve_relations_cost)?;
            ensure_capital(state, config.improve_relations_capital)?;
        }
        DiplomaticAction::SignTradeAgreement => {
            if country.trade_agreement {
                return Err(Rejection::precondition("trade agreement already in force"));
            }
            if country.relation < TRADE_RELATION_FLOOR {
                return Err(Rejection::precondition(format!(
                    "relations with {} are too cold for trade",
                    country.name
                )));
            }
        }
        DiplomaticAction::SignDefensePact => {
            if country.defense_pact {
                return Err(Rejection::precondition("defense pact already in force"));
            }
            if country.relation < DEFENSE_RELATION_FLOOR {
                return Err(Rejection::precondition(format!(
                    "{} does not trust us enough for a pact",
                    country.name
                )));
            }
        }
        DiplomaticAction::Denounce => {}
        DiplomaticAction::CancelTreaties => {
            if !country.trade_agreement && !country.defense_pact {
                return Err(Rejection::precondition("no treaties to cancel"));
            }
        }
    }

    if action == DiplomaticAction::ImproveRelations {
        state.adjust_budget(-config.improve_relations_cost);
        state.adjust_political_capital(-config.improve_relations_capital);
    }
    if action == DiplomaticAction::Denounce {
        state.adjust_popularity(2.0);
    }

    let country = &mut state.diplomacy.countries[index];
    let summary = match action {
        DiplomaticAction::ImproveRelations => {
            country.relation = clamp_percent(country.relation + 8.0);
            country.influence = clamp_percent(country.influence + 5.0);
            format!("Envoys sent to {}", country.name)
        }
        DiplomaticAction::SignTradeAgreement => {
            country.trade_agreement = true;
            format!("Trade agreement signed with {}", country.name)
        }
        DiplomaticAction::SignDefensePact => {
            country.defense_pact = true;
            format!("Defense pact signed with {}", country.name)
        }
        DiplomaticAction::Denounce => {
            country.relation = clamp_percent(country.relation - 15.0);
            country.influence = clamp_percent(country.influence - 5.0);
            format!("{} denounced", country.name)
        }
        DiplomaticAction::CancelTreaties => {
            country.trade_agreement = false;
            country.defense_pact = false;
            country.relation = clamp_percent(country.relation - 10.0);
            format!("Treaties with {} cancelled", country.name)
        }
    };
    info!(country = %country_id, ?action, "diplomatic action");
    state.log(LogCategory::Diplomacy, summary);
    Ok(())
}

/// Relations cool or warm toward neutral and influence fades.
pub fn diplomacy_decay(state: &mut GameState) {
    for country in &mut state.diplomacy.countries {
        country.relation = clamp_percent(country.relation + (50.0 - country.relation) * RELATION_DRIFT);
        country.influence = clamp_percent(country.influence * INFLUENCE_DECAY);
    }
}

pub fn record_human_rights_incident(state: &mut GameState) {
    state.diplomacy.human_rights_incidents += 1;
    for country in &mut state.diplomacy.countries {
        country.relation = clamp_percent(country.relation - HUMAN_RIGHTS_PENALTY);
    }
    state.log(
        LogCategory::Diplomacy,
        "Foreign governments condemn the crackdown",
    );
}

/// Annual growth added by trade agreements in force.
pub fn trade_growth_bonus(state: &GameState, config: &SimulationConfig) -> f64 {
    let agreements = state
        .diplomacy
        .countries
        .iter()
        .filter(|c| c.trade_agreement)
        .count();
    agreements as f64 * config.trade_agreement_growth_bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::Country;

    fn state_with(relation: f64) -> GameState {
        let mut state = GameState::default();
        state.resources.budget = 10.0;
        state.diplomacy.countries.push(Country {
            id: "nord".into(),
            name: "Nordmark".into(),
            relation,
            influence: 10.0,
            trade_agreement: false,
            defense_pact: false,
        });
        state
    }

    #[test]
    fn improving_relations_costs_money_and_capital() {
        let config = SimulationConfig::default();
        let mut state = state_with(50.0);
        apply_diplomatic_action(&mut state, "nord", DiplomaticAction::ImproveRelations, &config)
            .expect("affordable");
        assert_eq!(state.diplomacy.countries[0].relation, 58.0);
        assert_eq!(state.diplomacy.countries[0].influence, 15.0);
        assert_eq!(state.resources.budget, 9.5);
        assert_eq!(state.resources.political_capital, 45.0);
    }

    #[test]
    fn treaties_need_warm_relations() {
        let config = SimulationConfig::default();
        let mut state = state_with(59.0);
        assert!(matches!(
            apply_diplomatic_action(&mut state, "nord", DiplomaticAction::SignTradeAgreement, &config),
            Err(Rejection::Precondition(_))
        ));
        state.diplomacy.countries[0].relation = 60.0;
        apply_diplomatic_action(&mut state, "nord", DiplomaticAction::SignTradeAgreement, &config)
            .expect("signed");
        assert!(matches!(
            apply_diplomatic_action(&mut state, "nord", DiplomaticAction::SignDefensePact, &config),
            Err(Rejection::Precondition(_))
        ));
        assert!((trade_growth_bonus(&state, &config) - 0.002).abs() < 1e-12);

        apply_diplomatic_action(&mut state, "nord", DiplomaticAction::CancelTreaties, &config)
            .expect("cancelled");
        assert!(!state.diplomacy.countries[0].trade_agreement);
        assert_eq!(state.diplomacy.countries[0].relation, 50.0);
    }

    #[test]
    fn unknown_country_is_refused() {
        let config = SimulationConfig::default();
        let mut state = state_with(50.0);
        let before = state.clone();
        assert!(matches!(
            apply_diplomatic_action(&mut state, "atlantis", DiplomaticAction::Denounce, &config),
            Err(Rejection::UnknownTarget { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn monthly_drift_pulls_toward_neutral() {
        let mut state = state_with(100.0);
        diplomacy_decay(&mut state);
        assert_eq!(state.diplomacy.countries[0].relation, 99.0);
        assert_eq!(state.diplomacy.countries[0].influence, 9.5);
    }
}
