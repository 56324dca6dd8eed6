//! Ministers: appointment, dismissal and the monthly effect of their traits.

use tracing::info;

use crate::simulation::{
    ContentLibrary, GameState, GroupKind, LogCategory, Minister, MinisterTrait, Ministry,
    Rejection, ensure_capital,
};

fn dismissal_cost(minister: &Minister, factor: f64) -> f64 {
    minister.loyalty.max(0.0) * factor
}

/// Seats a candidate from the pool, replacing whoever holds the ministry.
pub fn appoint_minister(
    state: &mut GameState,
    content: &ContentLibrary,
    candidate_id: &str,
    ministry: Ministry,
    dismissal_factor: f64,
) -> Result<(), Rejection> {
    let candidate = content
        .candidate(candidate_id)
        .ok_or_else(|| Rejection::unknown("minister candidate", candidate_id))?;
    if state.government.ministers.iter().any(|m| m.id == candidate.id) {
        return Err(Rejection::precondition(format!(
            "{} already serves in the cabinet",
            candidate.name
        )));
    }
    let cost = state
        .government
        .minister(ministry)
        .map(|m| dismissal_cost(m, dismissal_factor))
        .unwrap_or(0.0);
    ensure_capital(state, cost)?;

    state.adjust_political_capital(-cost);
    state.government.ministers.retain(|m| m.ministry != ministry);
    let appointee = Minister {
        ministry,
        ..candidate.clone()
    };
    info!(minister = %appointee.id, ?ministry, "minister appointed");
    state.log(
        LogCategory::Politics,
        format!("{} takes over {ministry:?}", appointee.name),
    );
    state.government.ministers.push(appointee);
    Ok(())
}

pub fn fire_minister(
    state: &mut GameState,
    ministry: Ministry,
    dismissal_factor: f64,
) -> Result<(), Rejection> {
    let minister = state
        .government
        .minister(ministry)
        .ok_or_else(|| Rejection::unknown("ministry holder", format!("{ministry:?}")))?;
    let cost = dismissal_cost(minister, dismissal_factor);
    let name = minister.name.clone();
    ensure_capital(state, cost)?;
    state.adjust_political_capital(-cost);
    state.government.ministers.retain(|m| m.ministry != ministry);
    state.log(LogCategory::Politics, format!("{name} dismissed from {ministry:?}"));
    Ok(())
}

/// Removes a minister by id without charging for it; costs are carried by the caller.
pub fn dismiss_minister(state: &mut GameState, minister_id: &str) -> bool {
    let before = state.government.ministers.len();
    state.government.ministers.retain(|m| m.id != minister_id);
    let removed = state.government.ministers.len() < before;
    if removed {
        state.log(LogCategory::Politics, format!("Minister {minister_id} left the cabinet"));
    }
    removed
}

pub fn cabinet_effects(state: &mut GameState) {
    let traits: Vec<MinisterTrait> = state
        .government
        .ministers
        .iter()
        .flat_map(|m| m.traits.iter().copied())
        .collect();
    for t in traits {
        match t {
            MinisterTrait::Corrupt => state.adjust_budget(-0.2),
            MinisterTrait::Incompetent => state.adjust_stability(-0.5),
            MinisterTrait::Charismatic => state.adjust_popularity(0.5),
            MinisterTrait::Technocrat => {
                let gdp = state.stats.gdp;
                state.adjust_gdp(gdp * 0.0005);
            }
            MinisterTrait::Loyalist => state.adjust_political_capital(1.0),
            MinisterTrait::Reformer => {
                state.social.adjust_approval(GroupKind::Youth, 0.5);
            }
        }
    }
}
