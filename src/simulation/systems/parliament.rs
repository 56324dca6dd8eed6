use bevy_ecs::prelude::*;

use crate::simulation::{
    GameState, SimulationConfig, cabinet_effects, regenerate_capital, update_faction_stances,
};

pub fn cabinet_system(mut state: ResMut<GameState>) {
    cabinet_effects(&mut state);
}

/// Monthly stance drift, support recount and political-capital income.
pub fn parliament_system(mut state: ResMut<GameState>, config: Res<SimulationConfig>) {
    let popularity = state.stats.popularity;
    update_faction_stances(&mut state.government.parliament, popularity, &config);
    regenerate_capital(&mut state, &config);
}
