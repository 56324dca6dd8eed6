//! The closed set of player and clock actions, and the reasons one can be refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::{
    ContentLibrary, EmergencyAllocation, GameState, GroupKind, Ideology, Ministry, ProtestAction,
    SimulationConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lever", content = "value", rename_all = "snake_case")]
pub enum PolicyLever {
    TaxRate(f64),
    PublicSpending(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiplomaticAction {
    ImproveRelations,
    SignTradeAgreement,
    SignDefensePact,
    Denounce,
    CancelTreaties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    StartGame {
        country_id: String,
        ideology: Ideology,
        leader_name: String,
    },
    AdvanceDay,
    AdvanceMonth,
    SetSpeed {
        speed: u8,
    },
    TogglePause,
    SetPolicy {
        lever: PolicyLever,
    },
    ResolveEvent {
        choice: usize,
    },
    Diplomacy {
        country_id: String,
        action: DiplomaticAction,
    },
    AppointMinister {
        candidate_id: String,
        ministry: Ministry,
    },
    FireMinister {
        ministry: Ministry,
    },
    ProposeBill {
        template_id: String,
    },
    TriggerVote,
    NegotiateWithFaction {
        faction_id: String,
        capital: f64,
    },
    OpenNotification {
        id: u64,
    },
    DismissNotification {
        id: u64,
    },
    ResolveProtest {
        group: GroupKind,
        action: ProtestAction,
    },
    CensorMedia,
    FundPublicMedia {
        amount: f64,
    },
    StartCampaign,
    HoldRally {
        budget: f64,
    },
    SmearCampaign,
    StartProject {
        template_id: String,
    },
    RespondToSituation {
        situation_id: String,
        allocation: EmergencyAllocation,
    },
    LoadSnapshot {
        state: Box<GameState>,
    },
}

impl Action {
    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartGame { .. } => "start_game",
            Action::AdvanceDay => "advance_day",
            Action::AdvanceMonth => "advance_month",
            Action::SetSpeed { .. } => "set_speed",
            Action::TogglePause => "toggle_pause",
            Action::SetPolicy { .. } => "set_policy",
            Action::ResolveEvent { .. } => "resolve_event",
            Action::Diplomacy { .. } => "diplomacy",
            Action::AppointMinister { .. } => "appoint_minister",
            Action::FireMinister { .. } => "fire_minister",
            Action::ProposeBill { .. } => "propose_bill",
            Action::TriggerVote => "trigger_vote",
            Action::NegotiateWithFaction { .. } => "negotiate_with_faction",
            Action::OpenNotification { .. } => "open_notification",
            Action::DismissNotification { .. } => "dismiss_notification",
            Action::ResolveProtest { .. } => "resolve_protest",
            Action::CensorMedia => "censor_media",
            Action::FundPublicMedia { .. } => "fund_public_media",
            Action::StartCampaign => "start_campaign",
            Action::HoldRally { .. } => "hold_rally",
            Action::SmearCampaign => "smear_campaign",
            Action::StartProject { .. } => "start_project",
            Action::RespondToSituation { .. } => "respond_to_situation",
            Action::LoadSnapshot { .. } => "load_snapshot",
        }
    }
}

/// Why an action left the state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("no game in progress")]
    NoGameInProgress,
    #[error("unknown {kind} `{id}`")]
    UnknownTarget { kind: &'static str, id: String },
    #[error("needs {needed:.1} political capital, {available:.1} available")]
    InsufficientCapital { needed: f64, available: f64 },
    #[error("needs {needed:.2}B budget, {available:.2}B available")]
    InsufficientBudget { needed: f64, available: f64 },
    #[error("a bill is already in vote")]
    BillAlreadyActive,
    #[error("no bill is in vote")]
    NoActiveBill,
    #[error("no event awaits a decision")]
    NoActiveEvent,
    #[error("an event awaits a decision")]
    EventPending,
    #[error("choice {choice} out of range, event has {available}")]
    InvalidChoice { choice: usize, available: usize },
    #[error("{0}")]
    Precondition(String),
}

impl Rejection {
    pub fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        Rejection::UnknownTarget {
            kind,
            id: id.into(),
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        Rejection::Precondition(reason.into())
    }
}

pub fn ensure_capital(state: &GameState, needed: f64) -> Result<(), Rejection> {
    let available = state.resources.political_capital;
    if available < needed {
        return Err(Rejection::InsufficientCapital { needed, available });
    }
    Ok(())
}

pub fn ensure_budget(state: &GameState, needed: f64) -> Result<(), Rejection> {
    let available = state.resources.budget;
    if available < needed {
        return Err(Rejection::InsufficientBudget { needed, available });
    }
    Ok(())
}

/// Read-only world data handed to action handlers alongside the random source.
pub struct ActionContext<'w> {
    pub config: &'w SimulationConfig,
    pub content: &'w ContentLibrary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_round_trip_through_json() {
        let action = Action::SetPolicy {
            lever: PolicyLever::TaxRate(0.3),
        };
        let text = serde_json::to_string(&action).expect("serialize");
        assert_eq!(text, r#"{"type":"set_policy","lever":{"lever":"tax_rate","value":0.3}}"#);
        let back: Action = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, action);
    }

    #[test]
    fn guards_report_what_was_missing() {
        let state = GameState::default();
        assert_eq!(
            ensure_capital(&state, 80.0),
            Err(Rejection::InsufficientCapital {
                needed: 80.0,
                available: 50.0
            })
        );
        assert!(ensure_budget(&state, 0.0).is_ok());
        assert_eq!(
            Rejection::unknown("country", "atlantis").to_string(),
            "unknown country `atlantis`"
        );
    }
}
