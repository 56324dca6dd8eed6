use bevy_ecs::prelude::*;

use crate::simulation::{GameState, diplomacy_decay};

/// Relations drift toward neutral and influence fades each month.
pub fn diplomacy_system(mut state: ResMut<GameState>) {
    diplomacy_decay(&mut state);
}
