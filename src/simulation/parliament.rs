//! Bills, votes and faction politics.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulation::dice::{chance, roll};
use crate::simulation::{
    Bill, BillStatus, BillTemplate, GameState, LogCategory, NotificationKind, Parliament,
    Rejection, SimulationConfig, Stance, VoteTally, ensure_capital,
};

pub const IDEOLOGY_ALIGNMENT_BONUS: f64 = 0.1;
pub const VOTE_JITTER: f64 = 0.05;
pub const PARTY_LINE_LOYAL: f64 = 0.9;
pub const PARTY_LINE_OPPOSED: f64 = 0.2;

fn stance_support(stance: Stance) -> f64 {
    match stance {
        Stance::Supportive => 0.85,
        Stance::Neutral => 0.5,
        Stance::Hostile => 0.15,
    }
}

/// Percentage of faction seats not hostile to the government; falls back to
/// the government's seat share when no factions are modelled.
pub fn government_support(parliament: &Parliament) -> f64 {
    let mut total = 0.0;
    let mut friendly = 0.0;
    for faction in &parliament.factions {
        let seats = parliament.faction_seats(faction);
        total += seats;
        if faction.stance != Stance::Hostile {
            friendly += seats;
        }
    }
    if total > 0.0 {
        return friendly / total * 100.0;
    }
    if parliament.total_seats == 0 {
        return 0.0;
    }
    parliament.government_seats() as f64 / parliament.total_seats as f64 * 100.0
}

pub fn required_votes(total_seats: u32, majority: f64) -> u32 {
    (total_seats as f64 * majority.clamp(0.0, 1.0)).floor() as u32 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub approved: bool,
    pub votes: VoteTally,
}

pub fn simulate_bill_vote(
    bill: &Bill,
    parliament: &Parliament,
    proposed_by_government: bool,
    rng: &mut dyn RngCore,
) -> VoteResult {
    let mut yes = 0.0;

    for faction in &parliament.factions {
        let Some(party) = parliament.party(&faction.party_id) else {
            continue;
        };
        let seats = parliament.faction_seats(faction);
        let base = stance_support(faction.stance);
        let mut p = if proposed_by_government { base } else { 1.0 - base };
        let loyalty = (faction.loyalty_to_leader - 50.0) / 500.0;
        p += if party.is_government == proposed_by_government {
            loyalty
        } else {
            -loyalty
        };
        if bill.ideology == Some(party.ideology) {
            p += IDEOLOGY_ALIGNMENT_BONUS;
        }
        p += (roll(rng) - 0.5) * 2.0 * VOTE_JITTER;
        yes += seats * p.clamp(0.0, 1.0);
    }

    // Seats outside any faction follow the party line.
    for party in &parliament.parties {
        let organised: f64 = parliament
            .factions
            .iter()
            .filter(|f| f.party_id == party.id)
            .map(|f| parliament.faction_seats(f))
            .sum();
        let rest = (party.seats as f64 - organised).max(0.0);
        if rest == 0.0 {
            continue;
        }
        let mut p = if party.is_government == proposed_by_government {
            PARTY_LINE_LOYAL
        } else {
            PARTY_LINE_OPPOSED
        };
        if bill.ideology == Some(party.ideology) {
            p += IDEOLOGY_ALIGNMENT_BONUS;
        }
        yes += rest * p.clamp(0.0, 1.0);
    }

    let total = parliament.total_seats;
    let yes = (yes.round() as u32).min(total);
    let votes = VoteTally {
        yes,
        no: total - yes,
    };
    VoteResult {
        approved: yes >= required_votes(total, bill.required_majority),
        votes,
    }
}

pub fn propose_bill(
    state: &mut GameState,
    template: &BillTemplate,
    cost: f64,
) -> Result<(), Rejection> {
    if state.government.parliament.active_bill.is_some() {
        return Err(Rejection::BillAlreadyActive);
    }
    ensure_capital(state, cost)?;
    state.adjust_political_capital(-cost);
    state.government.parliament.active_bill = Some(Bill {
        template_id: template.id.clone(),
        title: template.title.clone(),
        status: BillStatus::InVote,
        required_majority: template.required_majority,
        ideology: template.ideology,
        effects: template.effects.clone(),
        proposed_on: state.time.date,
        votes: None,
    });
    info!(bill = %template.id, "bill proposed");
    state.log(
        LogCategory::Politics,
        format!("Bill proposed: {}", template.title),
    );
    Ok(())
}

pub fn trigger_vote(state: &mut GameState, rng: &mut dyn RngCore) -> Result<VoteResult, Rejection> {
    let mut bill = state
        .government
        .parliament
        .active_bill
        .take()
        .ok_or(Rejection::NoActiveBill)?;
    let result = simulate_bill_vote(&bill, &state.government.parliament, true, rng);
    bill.votes = Some(result.votes);

    if result.approved {
        bill.status = BillStatus::Passed;
        bill.effects.apply(state);
        state.notify(
            NotificationKind::Success,
            "Bill passed",
            format!(
                "{} passed {}-{}",
                bill.title, result.votes.yes, result.votes.no
            ),
        );
    } else {
        bill.status = BillStatus::Rejected;
        state.government.parliament.bills_failed_this_month += 1;
        state.notify(
            NotificationKind::Warning,
            "Bill rejected",
            format!(
                "{} failed {}-{}",
                bill.title, result.votes.yes, result.votes.no
            ),
        );
    }
    info!(bill = %bill.template_id, approved = result.approved, yes = result.votes.yes, no = result.votes.no, "vote held");
    state.log(
        LogCategory::Politics,
        format!(
            "{}: {} ({}-{})",
            bill.title,
            if result.approved { "passed" } else { "rejected" },
            result.votes.yes,
            result.votes.no
        ),
    );
    state.government.parliament.bill_history.push(bill);
    Ok(result)
}

/// Spends `capital` trying to warm a faction to the government; returns whether it worked.
pub fn negotiate_with_faction(
    state: &mut GameState,
    faction_id: &str,
    capital: f64,
    success_chance: f64,
    rng: &mut dyn RngCore,
) -> Result<bool, Rejection> {
    if !capital.is_finite() || capital <= 0.0 {
        return Err(Rejection::precondition("negotiation needs a positive capital stake"));
    }
    let index = state
        .government
        .parliament
        .factions
        .iter()
        .position(|f| f.id == faction_id)
        .ok_or_else(|| Rejection::unknown("faction", faction_id))?;
    ensure_capital(state, capital)?;
    state.adjust_political_capital(-capital);

    let success = chance(rng, success_chance);
    let parliament = &mut state.government.parliament;
    let faction = &mut parliament.factions[index];
    let name = faction.name.clone();
    if success {
        faction.stance = faction.stance.promoted();
        faction.loyalty_to_leader = (faction.loyalty_to_leader + 5.0).clamp(0.0, 100.0);
    }
    parliament.government_support = government_support(parliament);

    state.log(
        LogCategory::Politics,
        if success {
            format!("Talks with {name} paid off")
        } else {
            format!("Talks with {name} went nowhere")
        },
    );
    Ok(success)
}

/// Monthly stance drift driven by popularity and the month's failed bills.
pub fn update_faction_stances(parliament: &mut Parliament, popularity: f64, config: &SimulationConfig) {
    let pivot = config.stance_popularity_pivot;
    let pressure = (popularity - pivot) / pivot.max(1.0)
        - parliament.bills_failed_this_month as f64 * config.stance_failed_bill_weight;
    for faction in &mut parliament.factions {
        faction.loyalty_to_leader = (faction.loyalty_to_leader + pressure * 5.0).clamp(0.0, 100.0);
        if pressure > 0.2 && faction.loyalty_to_leader >= 60.0 {
            faction.stance = faction.stance.promoted();
        } else if pressure < -0.2 && faction.loyalty_to_leader < 40.0 {
            faction.stance = faction.stance.demoted();
        }
    }
    parliament.government_support = government_support(parliament);
    parliament.bills_failed_this_month = 0;
}

/// Monthly political-capital income, capped so it never pushes past the ceiling.
pub fn regenerate_capital(state: &mut GameState, config: &SimulationConfig) {
    let current = state.resources.political_capital;
    let ceiling = config.max_political_capital;
    if current >= ceiling {
        return;
    }
    let income = (config.capital_regen_base + (state.stats.popularity - 50.0) / 10.0).max(0.0);
    state.resources.political_capital = (current + income).min(ceiling);
}
