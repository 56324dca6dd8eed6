use bevy_ecs::prelude::*;

use crate::simulation::{
    ContentLibrary, Dice, GameState, SimulationConfig, roll_events, tick_scheduled,
    tick_storylines,
};

pub fn scheduled_event_system(mut state: ResMut<GameState>, content: Res<ContentLibrary>) {
    tick_scheduled(&mut state, &content);
}

pub fn storyline_system(mut state: ResMut<GameState>, content: Res<ContentLibrary>) {
    tick_storylines(&mut state, &content);
}

/// Scandal and random-table roll; skipped while a decision is pending.
pub fn event_roll_system(
    mut state: ResMut<GameState>,
    content: Res<ContentLibrary>,
    config: Res<SimulationConfig>,
    mut dice: ResMut<Dice>,
) {
    roll_events(&mut state, &content, &config, dice.rng());
}
