//! Monthly application of the economic model.

use bevy_ecs::prelude::*;
use tracing::debug;

use crate::simulation::{
    GameState, LogCategory, SimulationConfig, compute_economy, trade_growth_bonus,
};

/// Unemployment moves against growth above this rate.
const NEUTRAL_GROWTH: f64 = 0.02;
/// Inflation above this level wears stability down.
const TOLERATED_INFLATION: f64 = 0.05;

pub fn economy_system(mut state: ResMut<GameState>, config: Res<SimulationConfig>) {
    let state = &mut *state;
    let report = compute_economy(
        state.stats.gdp,
        state.policies.tax_rate,
        state.policies.public_spending,
    );
    let growth = report.growth_rate + trade_growth_bonus(state, &config);

    state.adjust_budget(report.budget_surplus / 12.0);
    let gdp = state.stats.gdp;
    state.set_gdp(gdp * (1.0 + growth / 12.0));
    let inflation = state.stats.inflation;
    state.adjust_inflation((report.inflation - inflation) * 0.5);
    state.adjust_unemployment((NEUTRAL_GROWTH - growth) * 0.05);

    let popularity = state.stats.popularity;
    let overheating = (state.stats.inflation - TOLERATED_INFLATION).max(0.0);
    state.adjust_stability((popularity - 50.0) * 0.02 - overheating * 50.0);

    debug!(
        growth,
        surplus = report.budget_surplus,
        inflation = state.stats.inflation,
        "economy updated"
    );
    state.log(
        LogCategory::Economy,
        format!(
            "Monthly accounts: surplus {:+.1}B/yr, growth {:.1}%, inflation {:.1}%",
            report.budget_surplus,
            growth * 100.0,
            state.stats.inflation * 100.0
        ),
    );
}
