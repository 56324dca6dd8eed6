//! Static content tables: country templates, events, bills, storylines,
//! grand projects and the minister candidate pool. The core only looks
//! entries up by id; loading them is the caller's business.

use std::collections::BTreeMap;

use bevy_ecs::prelude::Resource;
use serde::Deserialize;

use crate::simulation::{
    Consequences, Country, EventCondition, EventDefinition, Faction, Ideology, InterestGroup,
    Minister, Party, StatDelta, VarRequirement,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CountryTemplate {
    pub id: String,
    pub name: String,
    pub gdp: f64,
    pub population: u64,
    #[serde(default)]
    pub budget: f64,
    pub tax_rate: f64,
    pub public_spending: f64,
    #[serde(default = "default_inflation")]
    pub inflation: f64,
    #[serde(default = "default_unemployment")]
    pub unemployment: f64,
    #[serde(default = "default_percent")]
    pub stability: f64,
    #[serde(default = "default_percent")]
    pub popularity: f64,
    #[serde(default = "default_capital")]
    pub political_capital: f64,
    pub parties: Vec<Party>,
    #[serde(default)]
    pub factions: Vec<Faction>,
    #[serde(default)]
    pub ministers: Vec<Minister>,
    #[serde(default)]
    pub neighbours: Vec<Country>,
    /// Overrides for the baseline interest groups; missing kinds use the baseline.
    #[serde(default)]
    pub interest_groups: Vec<InterestGroup>,
}

fn default_inflation() -> f64 {
    0.02
}

fn default_unemployment() -> f64 {
    0.06
}

fn default_percent() -> f64 {
    50.0
}

fn default_capital() -> f64 {
    50.0
}

fn default_majority() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillTemplate {
    pub id: String,
    pub title: String,
    #[serde(default = "default_majority")]
    pub required_majority: f64,
    #[serde(default)]
    pub ideology: Option<Ideology>,
    #[serde(default)]
    pub effects: StatDelta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    /// Paid up front, in billions.
    pub cost: f64,
    #[serde(default)]
    pub monthly_upkeep: f64,
    pub duration_months: u32,
    #[serde(default)]
    pub payoff: StatDelta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryStage {
    pub event_id: String,
    #[serde(default)]
    pub auto_advance: bool,
    #[serde(default)]
    pub advance_condition: Option<EventCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryEnding {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub requires: BTreeMap<String, VarRequirement>,
    #[serde(default)]
    pub consequences: Consequences,
}

impl StoryEnding {
    pub fn matches(&self, vars: &BTreeMap<String, crate::simulation::StoryValue>) -> bool {
        self.requires
            .iter()
            .all(|(name, requirement)| requirement.matches(vars.get(name)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storyline {
    pub id: String,
    pub title: String,
    /// Gate for the first stage; absent means the storyline opens at once.
    #[serde(default)]
    pub start_condition: Option<EventCondition>,
    pub stages: Vec<StoryStage>,
    #[serde(default)]
    pub endings: Vec<StoryEnding>,
}

#[derive(Debug, Clone, Default, Deserialize, Resource)]
#[serde(default)]
pub struct ContentLibrary {
    pub countries: Vec<CountryTemplate>,
    pub events: Vec<EventDefinition>,
    pub bills: Vec<BillTemplate>,
    pub storylines: Vec<Storyline>,
    pub projects: Vec<ProjectTemplate>,
    pub minister_pool: Vec<Minister>,
}

impl ContentLibrary {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn country(&self, id: &str) -> Option<&CountryTemplate> {
        self.countries.iter().find(|c| c.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn bill(&self, id: &str) -> Option<&BillTemplate> {
        self.bills.iter().find(|b| b.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&ProjectTemplate> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn storyline(&self, id: &str) -> Option<&Storyline> {
        self.storylines.iter().find(|s| s.id == id)
    }

    pub fn candidate(&self, id: &str) -> Option<&Minister> {
        self.minister_pool.iter().find(|m| m.id == id)
    }

    /// Whether an event is bound to some storyline stage.
    pub fn is_stage_event(&self, event_id: &str) -> bool {
        self.storylines
            .iter()
            .flat_map(|s| s.stages.iter())
            .any(|stage| stage.event_id == event_id)
    }
}
