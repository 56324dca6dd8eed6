use bevy_ecs::prelude::*;

use crate::simulation::{GameState, tick_situations};

pub fn situation_system(mut state: ResMut<GameState>) {
    tick_situations(&mut state);
}
