//! Tunable simulation parameters.

use std::time::Duration;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Real-time milliseconds per simulated day at speeds 1, 2 and 3.
    pub day_interval_ms: [u64; 3],
    /// Cadence of the scheduling loop; independent of the day interval.
    pub frame_interval_ms: u64,
    pub bill_proposal_cost: f64,
    pub scandal_chance: f64,
    /// Chance per eligible day that the declarative event table is consulted.
    pub event_roll_chance: f64,
    pub faction_negotiation_success: f64,
    /// Popularity at which faction stances stop drifting.
    pub stance_popularity_pivot: f64,
    /// Stance pressure removed per bill that failed during the month.
    pub stance_failed_bill_weight: f64,
    pub capital_regen_base: f64,
    pub max_political_capital: f64,
    pub minister_dismissal_factor: f64,
    pub trade_agreement_growth_bonus: f64,
    pub improve_relations_cost: f64,
    pub improve_relations_capital: f64,
    pub emergency_response_cost: f64,
    pub log_capacity: usize,
}

impl SimulationConfig {
    /// Real-time interval per simulated day for a speed level; `None` while paused.
    pub fn day_interval(&self, speed: u8) -> Option<Duration> {
        match speed {
            1..=3 => Some(Duration::from_millis(
                self.day_interval_ms[speed as usize - 1],
            )),
            _ => None,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            day_interval_ms: [1_000, 500, 200],
            frame_interval_ms: 16,
            bill_proposal_cost: 10.0,
            scandal_chance: 0.10,
            event_roll_chance: 0.08,
            faction_negotiation_success: 0.6,
            stance_popularity_pivot: 50.0,
            stance_failed_bill_weight: 0.2,
            capital_regen_base: 5.0,
            max_political_capital: 200.0,
            minister_dismissal_factor: 0.2,
            trade_agreement_growth_bonus: 0.002,
            improve_relations_cost: 0.5,
            improve_relations_capital: 5.0,
            emergency_response_cost: 2.0,
            log_capacity: 256,
        }
    }
}
