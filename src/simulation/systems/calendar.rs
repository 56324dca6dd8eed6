use bevy_ecs::prelude::*;
use tracing::debug;

use crate::simulation::GameState;

/// Moves the clock one day forward.
pub fn calendar_system(mut state: ResMut<GameState>) {
    let next = state.time.date.next_day();
    debug!(date = %next, "day advanced");
    state.time.date = next;
}
