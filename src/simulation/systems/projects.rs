use bevy_ecs::prelude::*;

use crate::simulation::{ContentLibrary, GameState, advance_projects};

pub fn project_system(mut state: ResMut<GameState>, content: Res<ContentLibrary>) {
    advance_projects(&mut state, &content);
}
