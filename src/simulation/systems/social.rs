use bevy_ecs::prelude::*;

use crate::simulation::{
    Dice, GameState, campaign_drift, drift_group_approval, expire_approval_modifiers,
    ignite_protests, media_drift, update_protests, weighted_popularity,
};

/// Daily protest escalation and decay.
pub fn protest_system(mut state: ResMut<GameState>, mut dice: ResMut<Dice>) {
    update_protests(&mut state, dice.rng());
}

/// Monthly approval drift, modifier expiry, popularity blend and protest ignition.
pub fn interest_group_system(mut state: ResMut<GameState>, mut dice: ResMut<Dice>) {
    drift_group_approval(&mut state);
    expire_approval_modifiers(&mut state);
    let approval = weighted_popularity(&state.social.interest_groups);
    let popularity = state.stats.popularity;
    state.set_popularity((popularity + approval) / 2.0);
    ignite_protests(&mut state, dice.rng());
}

pub fn media_system(mut state: ResMut<GameState>) {
    media_drift(&mut state);
}

pub fn campaign_system(mut state: ResMut<GameState>) {
    campaign_drift(&mut state);
}
