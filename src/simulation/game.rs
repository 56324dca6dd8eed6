//! Building a fresh game from a country template and the leader's ideology.

use crate::simulation::{
    CountryTemplate, DiplomacyState, GameDate, GameState, GameTime, Government, GroupKind,
    Ideology, InterestGroup, LogBook, LogCategory, MIN_GDP, Minister, NotificationKind, Parliament,
    Player, Policies, Resources, SimulationConfig, SocialState, Stats, UNEMPLOYMENT_CEILING,
    UNEMPLOYMENT_FLOOR, clamp_percent,
};

struct IdeologyProfile {
    tax_shift: f64,
    spending_shift: f64,
    capital_bonus: f64,
    stability_bonus: f64,
    relation_shift: f64,
    approval: &'static [(GroupKind, f64)],
}

fn profile(ideology: Ideology) -> IdeologyProfile {
    match ideology {
        Ideology::Socialist => IdeologyProfile {
            tax_shift: 0.05,
            spending_shift: 0.05,
            capital_bonus: 0.0,
            stability_bonus: 0.0,
            relation_shift: 0.0,
            approval: &[
                (GroupKind::Workers, 10.0),
                (GroupKind::Youth, 5.0),
                (GroupKind::Business, -10.0),
            ],
        },
        Ideology::Liberal => IdeologyProfile {
            tax_shift: 0.0,
            spending_shift: 0.0,
            capital_bonus: 5.0,
            stability_bonus: 0.0,
            relation_shift: 5.0,
            approval: &[
                (GroupKind::Business, 5.0),
                (GroupKind::Youth, 5.0),
                (GroupKind::Clergy, -5.0),
            ],
        },
        Ideology::Conservative => IdeologyProfile {
            tax_shift: -0.03,
            spending_shift: -0.02,
            capital_bonus: 0.0,
            stability_bonus: 3.0,
            relation_shift: 0.0,
            approval: &[
                (GroupKind::Business, 10.0),
                (GroupKind::Clergy, 10.0),
                (GroupKind::Workers, -5.0),
                (GroupKind::Youth, -5.0),
            ],
        },
        Ideology::Nationalist => IdeologyProfile {
            tax_shift: 0.0,
            spending_shift: 0.02,
            capital_bonus: 0.0,
            stability_bonus: 5.0,
            relation_shift: -5.0,
            approval: &[
                (GroupKind::Military, 15.0),
                (GroupKind::Farmers, 5.0),
                (GroupKind::Youth, -5.0),
            ],
        },
    }
}

fn interest_groups(template: &CountryTemplate) -> Vec<InterestGroup> {
    GroupKind::ALL
        .iter()
        .map(|kind| {
            template
                .interest_groups
                .iter()
                .find(|g| g.kind == *kind)
                .cloned()
                .unwrap_or_else(|| InterestGroup::baseline(*kind))
        })
        .collect()
}

pub fn new_game(
    template: &CountryTemplate,
    ideology: Ideology,
    leader_name: &str,
    config: &SimulationConfig,
) -> GameState {
    let profile = profile(ideology);
    let gdp = template.gdp.max(MIN_GDP);
    let tax_rate = (template.tax_rate + profile.tax_shift).clamp(0.0, 1.0);
    let public_spending = (template.public_spending + profile.spending_shift * gdp).max(0.0);

    let mut social = SocialState {
        interest_groups: interest_groups(template),
        ..Default::default()
    };
    for (kind, shift) in profile.approval {
        social.adjust_approval(*kind, *shift);
    }

    let mut countries = template.neighbours.clone();
    for country in &mut countries {
        country.relation = clamp_percent(country.relation + profile.relation_shift);
    }

    let start = GameDate::default();
    let mut state = GameState {
        player: Player {
            leader_name: leader_name.to_string(),
            country_id: template.id.clone(),
            country_name: template.name.clone(),
            ideology,
        },
        resources: Resources {
            budget: template.budget,
            political_capital: template.political_capital + profile.capital_bonus,
            stability: clamp_percent(template.stability + profile.stability_bonus),
        },
        stats: Stats {
            gdp,
            population: template.population,
            inflation: template.inflation,
            unemployment: template
                .unemployment
                .clamp(UNEMPLOYMENT_FLOOR, UNEMPLOYMENT_CEILING),
            popularity: clamp_percent(template.popularity),
        },
        policies: Policies {
            tax_rate,
            public_spending,
            active_projects: Vec::new(),
        },
        diplomacy: DiplomacyState {
            countries,
            human_rights_incidents: 0,
        },
        government: Government {
            ministers: unique_slots(&template.ministers),
            parliament: Parliament::new(template.parties.clone(), template.factions.clone()),
        },
        social,
        time: GameTime {
            date: start,
            start_date: start,
            is_playing: true,
            speed: 1,
        },
        logs: LogBook::new(config.log_capacity),
        ..Default::default()
    };
    state.log(
        LogCategory::System,
        format!("{} takes office in {}", leader_name, template.name),
    );
    state.notify(
        NotificationKind::Info,
        "Welcome",
        format!("The nation of {} awaits your leadership.", template.name),
    );
    state
}

/// First minister listed for a ministry wins its slot.
fn unique_slots(ministers: &[Minister]) -> Vec<Minister> {
    let mut seated: Vec<Minister> = Vec::new();
    for minister in ministers {
        if !seated.iter().any(|m| m.ministry == minister.ministry) {
            seated.push(minister.clone());
        }
    }
    seated
}
