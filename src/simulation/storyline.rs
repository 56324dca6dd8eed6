//! Multi-stage story arcs. Each stage fires one bound event; stages advance
//! either right after the event resolves or once their advance condition
//! holds. When the last stage is done, the first ending whose variable
//! requirements match is applied.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::simulation::{
    ContentLibrary, EventSource, GameDate, GameState, LogCategory, NotificationKind, Storyline,
    apply_consequences, evaluate_condition, fire_event,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePhase {
    /// The stage's event has not fired yet.
    AwaitingEvent,
    /// The stage's event is on screen.
    InProgress,
    /// Resolved; waiting for the advance condition.
    AwaitingAdvance,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorylineProgress {
    pub stage: usize,
    pub phase: StagePhase,
    pub started_on: GameDate,
    pub ending: Option<String>,
}

/// Opens, advances and fires storyline stages. At most one event fires per call.
pub fn tick_storylines(state: &mut GameState, content: &ContentLibrary) {
    for storyline in &content.storylines {
        if state.events.active_event.is_some() {
            return;
        }
        let progress = match state.events.storylines.get(&storyline.id) {
            Some(progress) => progress.clone(),
            None => {
                let opens = storyline
                    .start_condition
                    .as_ref()
                    .is_none_or(|c| evaluate_condition(c, state));
                if !opens || storyline.stages.is_empty() {
                    continue;
                }
                info!(storyline = %storyline.id, "storyline opened");
                let progress = StorylineProgress {
                    stage: 0,
                    phase: StagePhase::AwaitingEvent,
                    started_on: state.time.date,
                    ending: None,
                };
                state
                    .events
                    .storylines
                    .insert(storyline.id.clone(), progress.clone());
                progress
            }
        };

        match progress.phase {
            StagePhase::AwaitingEvent => fire_stage(state, content, storyline, progress.stage),
            StagePhase::AwaitingAdvance => {
                let ready = storyline
                    .stages
                    .get(progress.stage)
                    .and_then(|s| s.advance_condition.as_ref())
                    .is_none_or(|c| evaluate_condition(c, state));
                if ready {
                    advance(state, storyline);
                }
            }
            StagePhase::InProgress | StagePhase::Completed => {}
        }
    }
}

fn fire_stage(state: &mut GameState, content: &ContentLibrary, storyline: &Storyline, stage: usize) {
    let Some(event_id) = storyline.stages.get(stage).map(|s| s.event_id.as_str()) else {
        return;
    };
    let Some(event) = content.event(event_id) else {
        warn!(storyline = %storyline.id, event = %event_id, "stage event missing from content");
        return;
    };
    fire_event(
        state,
        event,
        EventSource::Storyline {
            storyline_id: storyline.id.clone(),
            stage,
        },
    );
    if let Some(progress) = state.events.storylines.get_mut(&storyline.id) {
        progress.phase = StagePhase::InProgress;
    }
}

/// Called after a storyline stage event has been resolved.
pub fn on_stage_resolved(
    state: &mut GameState,
    content: &ContentLibrary,
    storyline_id: &str,
    stage: usize,
) {
    let Some(storyline) = content.storyline(storyline_id) else {
        return;
    };
    match state.events.storylines.get_mut(storyline_id) {
        Some(progress) if progress.stage == stage && progress.phase == StagePhase::InProgress => {
            progress.phase = StagePhase::AwaitingAdvance;
        }
        _ => return,
    }
    let auto = storyline
        .stages
        .get(stage)
        .is_some_and(|s| s.auto_advance);
    if auto {
        advance(state, storyline);
    }
}

fn advance(state: &mut GameState, storyline: &Storyline) {
    let next_stage = match state.events.storylines.get_mut(&storyline.id) {
        Some(progress) => {
            progress.stage += 1;
            progress.phase = StagePhase::AwaitingEvent;
            progress.stage
        }
        None => return,
    };
    if next_stage >= storyline.stages.len() {
        conclude(state, storyline);
    }
}

fn conclude(state: &mut GameState, storyline: &Storyline) {
    let ending = storyline
        .endings
        .iter()
        .find(|e| e.matches(&state.events.story_vars));

    if let Some(progress) = state.events.storylines.get_mut(&storyline.id) {
        progress.phase = StagePhase::Completed;
        progress.ending = ending.map(|e| e.id.clone());
    }

    match ending {
        Some(ending) => {
            info!(storyline = %storyline.id, ending = %ending.id, "storyline concluded");
            apply_consequences(state, &ending.consequences, &storyline.id);
            state.log(
                LogCategory::Event,
                format!("{} ended: {}", storyline.title, ending.title),
            );
            state.notify(NotificationKind::Success, storyline.title.clone(), ending.title.clone());
        }
        None => {
            state.log(
                LogCategory::Event,
                format!("{} ended without resolution", storyline.title),
            );
        }
    }
}
