//! Additive stat/resource deltas shared by bills, event choices, storyline
//! endings, project payoffs and situation pressure.

use serde::{Deserialize, Serialize};

use crate::simulation::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatDelta {
    pub budget: f64,
    pub political_capital: f64,
    pub stability: f64,
    pub gdp: f64,
    pub inflation: f64,
    pub unemployment: f64,
    pub popularity: f64,
}

impl StatDelta {
    pub fn is_empty(&self) -> bool {
        *self == StatDelta::default()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            budget: self.budget * factor,
            political_capital: self.political_capital * factor,
            stability: self.stability * factor,
            gdp: self.gdp * factor,
            inflation: self.inflation * factor,
            unemployment: self.unemployment * factor,
            popularity: self.popularity * factor,
        }
    }

    pub fn apply(&self, state: &mut GameState) {
        state.adjust_budget(self.budget);
        state.adjust_political_capital(self.political_capital);
        state.adjust_stability(self.stability);
        state.adjust_gdp(self.gdp);
        state.adjust_inflation(self.inflation);
        state.adjust_unemployment(self.unemployment);
        state.adjust_popularity(self.popularity);
    }

    /// Short human-readable summary of the non-zero components.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = [
            ("budget", self.budget),
            ("capital", self.political_capital),
            ("stability", self.stability),
            ("gdp", self.gdp),
            ("inflation", self.inflation),
            ("unemployment", self.unemployment),
            ("popularity", self.popularity),
        ]
        .into_iter()
        .filter(|(_, v)| *v != 0.0)
        .map(|(name, v)| format!("{name} {v:+.3}"))
        .collect();
        if parts.is_empty() {
            "no effect".to_string()
        } else {
            parts.join(", ")
        }
    }
}
