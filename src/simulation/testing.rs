//! Deterministic randomness and small fixtures for tests and examples.

use rand::RngCore;

use crate::simulation::{
    ContentLibrary, GameState, Ideology, Simulation, SimulationConfig, new_game,
};

/// Replays a fixed, cycling sequence of unit-interval rolls. An empty
/// sequence always rolls 0.5.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, cursor: 0 }
    }

    fn next_roll(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.5;
        }
        let roll = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        roll
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// `rand` builds an `f64` from the top 53 bits, so this maps back exactly.
    fn next_u64(&mut self) -> u64 {
        let roll = self.next_roll().clamp(0.0, 1.0 - f64::EPSILON);
        ((roll * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

const FIXTURE_CONTENT: &str = r#"{
    "countries": [{
        "id": "valoria",
        "name": "Valoria",
        "gdp": 1000,
        "population": 12000000,
        "budget": 40,
        "tax_rate": 0.25,
        "public_spending": 150,
        "stability": 62,
        "popularity": 55,
        "political_capital": 50,
        "parties": [
            { "id": "unity", "name": "Unity Party", "seats": 180, "is_government": true, "ideology": "liberal" },
            { "id": "labour", "name": "Labour Front", "seats": 120, "is_government": false, "ideology": "socialist" }
        ],
        "factions": [
            { "id": "unity_core", "name": "Old Guard", "party_id": "unity", "stance": "supportive", "size": 70, "influence": 60, "loyalty_to_leader": 70 },
            { "id": "unity_rebels", "name": "Reformists", "party_id": "unity", "stance": "neutral", "size": 30, "influence": 40, "loyalty_to_leader": 45 },
            { "id": "labour_left", "name": "Red Wing", "party_id": "labour", "stance": "hostile", "size": 100, "influence": 50, "loyalty_to_leader": 20 }
        ],
        "ministers": [
            { "id": "min_finance", "name": "Ilse Brand", "ministry": "finance", "loyalty": 60, "competence": 70 },
            { "id": "min_interior", "name": "Tomas Kell", "ministry": "interior", "loyalty": 40, "competence": 45, "traits": ["corrupt"] },
            { "id": "min_health", "name": "Nora Vidal", "ministry": "health", "loyalty": 55, "competence": 65, "traits": ["charismatic"] }
        ],
        "neighbours": [
            { "id": "nordmark", "name": "Nordmark", "relation": 55 },
            { "id": "sudland", "name": "Sudland", "relation": 70, "influence": 10 }
        ]
    }],
    "events": [
        {
            "id": "budget_leak",
            "title": "Budget Leak",
            "description": "Draft budget figures have reached the press.",
            "choices": [
                { "label": "Launch an inquiry", "consequences": { "effects": { "budget": -2 }, "story_vars": { "leak_handled": true } } },
                { "label": "Deny everything", "consequences": { "effects": { "popularity": -3 }, "delayed": { "event_id": "union_ultimatum", "delay_days": 3 } } }
            ]
        },
        {
            "id": "union_ultimatum",
            "title": "Union Ultimatum",
            "triggered_only": true,
            "choices": [
                { "label": "Meet the unions", "consequences": { "approval": [{ "group": "workers", "amount": 10, "duration_months": 3 }] } },
                { "label": "Refuse", "consequences": { "effects": { "stability": -3 } } }
            ]
        },
        {
            "id": "strike_begins",
            "title": "General Strike",
            "choices": [
                { "label": "Appoint a mediator", "consequences": { "story_vars": { "strike_approach": "mediator" } } },
                { "label": "Send in the police", "consequences": { "story_vars": { "strike_approach": "hardliner" }, "effects": { "stability": -5 } } }
            ]
        },
        {
            "id": "strike_talks",
            "title": "Strike Talks",
            "choices": [
                { "label": "Sign the accord", "consequences": { "effects": { "budget": -1 } } },
                { "label": "Walk out", "consequences": { "effects": { "stability": -4 } } }
            ]
        }
    ],
    "bills": [
        { "id": "infrastructure_act", "title": "Infrastructure Act", "effects": { "gdp": 15, "budget": -3 } },
        { "id": "austerity_package", "title": "Austerity Package", "ideology": "conservative", "effects": { "budget": 5, "popularity": -3 } }
    ],
    "storylines": [{
        "id": "general_strike",
        "title": "The General Strike",
        "start_condition": { "stability": { "max": 45 } },
        "stages": [
            { "event_id": "strike_begins", "auto_advance": true },
            { "event_id": "strike_talks", "advance_condition": { "stability": { "min": 50 } } }
        ],
        "endings": [
            { "id": "social_pact", "title": "A new social pact", "requires": { "strike_approach": { "equals": "mediator" } }, "consequences": { "effects": { "political_capital": 10 } } },
            { "id": "crackdown", "title": "The strike is broken", "requires": { "strike_approach": { "equals": "hardliner" } }, "consequences": { "effects": { "stability": -5 } } }
        ]
    }],
    "projects": [
        { "id": "rail_network", "name": "National Rail Network", "cost": 8, "monthly_upkeep": 0.5, "duration_months": 3, "payoff": { "gdp": 20 } }
    ],
    "minister_pool": [
        { "id": "cand_technocrat", "name": "Edda Lind", "ministry": "finance", "loyalty": 50, "competence": 85, "traits": ["technocrat"] },
        { "id": "cand_loyalist", "name": "Piet Aal", "ministry": "interior", "loyalty": 90, "competence": 50, "traits": ["loyalist"] }
    ]
}"#;

/// A small library: one country, a handful of events, a two-stage storyline,
/// two bills, one project and two minister candidates.
pub fn fixture_content() -> ContentLibrary {
    ContentLibrary::from_json(FIXTURE_CONTENT).expect("fixture content is valid")
}

/// A fresh Liberal game in Valoria, playing at speed 1.
pub fn fixture_state() -> GameState {
    let content = fixture_content();
    let template = content.country("valoria").expect("fixture country");
    new_game(template, Ideology::Liberal, "Tester", &SimulationConfig::default())
}

pub fn fixture_simulation(rolls: Vec<f64>) -> Simulation {
    Simulation::new(
        SimulationConfig::default(),
        fixture_content(),
        Box::new(ScriptedRng::new(rolls)),
    )
}
