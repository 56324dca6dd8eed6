//! Colorized chronicle output for quick CLI scanning.

use bevy_ecs::prelude::*;
use tracing::info;

use crate::simulation::{GameState, format_entry_line, format_status_line};

/// Count of log entries already echoed to the tracing output.
#[derive(Resource, Debug, Default)]
pub struct JournalCursor(pub u64);

/// Echoes the log entries written since the previous run.
pub fn journal_system(state: Res<GameState>, mut cursor: ResMut<JournalCursor>) {
    for entry in state.logs.since(cursor.0) {
        info!("{}", format_entry_line(entry));
    }
    cursor.0 = state.logs.total();
}

pub fn status_system(state: Res<GameState>) {
    info!("{}", format_status_line(&state));
}
