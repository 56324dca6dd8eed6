//! The game-state snapshot and the data types it is built from.
//!
//! A `GameState` is a plain value: every transition receives one by value and
//! returns the next. All clamped fields are written through the `adjust_*`
//! helpers so no mutation site can leave a declared range.

use std::collections::{BTreeMap, VecDeque};

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::simulation::{
    ApprovalModifier, GameDate, PendingEvent, ScheduledEvent, Situation, StoryValue,
    StorylineProgress,
};

pub const MIN_GDP: f64 = 1.0;
pub const UNEMPLOYMENT_FLOOR: f64 = 0.01;
pub const UNEMPLOYMENT_CEILING: f64 = 0.30;

pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Ideology {
    Socialist,
    #[default]
    Liberal,
    Conservative,
    Nationalist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Player {
    pub leader_name: String,
    pub country_id: String,
    pub country_name: String,
    pub ideology: Ideology,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub budget: f64,
    pub political_capital: f64,
    pub stability: f64,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            budget: 0.0,
            political_capital: 50.0,
            stability: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Billions per year.
    pub gdp: f64,
    pub population: u64,
    pub inflation: f64,
    pub unemployment: f64,
    pub popularity: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            gdp: 1_000.0,
            population: 10_000_000,
            inflation: 0.02,
            unemployment: 0.06,
            popularity: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProject {
    pub template_id: String,
    pub name: String,
    pub months_remaining: u32,
    pub total_months: u32,
    pub monthly_upkeep: f64,
}

impl ActiveProject {
    pub fn progress(&self) -> f64 {
        if self.total_months == 0 {
            return 100.0;
        }
        let done = self.total_months.saturating_sub(self.months_remaining) as f64;
        clamp_percent(done / self.total_months as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policies {
    pub tax_rate: f64,
    /// Absolute spending, same unit as GDP.
    pub public_spending: f64,
    pub active_projects: Vec<ActiveProject>,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            tax_rate: 0.25,
            public_spending: 150.0,
            active_projects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub relation: f64,
    #[serde(default)]
    pub influence: f64,
    #[serde(default)]
    pub trade_agreement: bool,
    #[serde(default)]
    pub defense_pact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiplomacyState {
    pub countries: Vec<Country>,
    pub human_rights_incidents: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ministry {
    Finance,
    Interior,
    ForeignAffairs,
    Defense,
    Health,
    Education,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinisterTrait {
    Corrupt,
    Incompetent,
    Charismatic,
    Technocrat,
    Loyalist,
    Reformer,
}

impl MinisterTrait {
    /// Traits that make a minister a scandal target.
    pub fn is_disqualifying(self) -> bool {
        matches!(self, MinisterTrait::Corrupt | MinisterTrait::Incompetent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minister {
    pub id: String,
    pub name: String,
    pub ministry: Ministry,
    pub loyalty: f64,
    pub competence: f64,
    #[serde(default)]
    pub traits: Vec<MinisterTrait>,
}

impl Minister {
    pub fn has_trait(&self, t: MinisterTrait) -> bool {
        self.traits.contains(&t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    pub seats: u32,
    pub is_government: bool,
    pub ideology: Ideology,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Hostile,
    Neutral,
    Supportive,
}

impl Stance {
    pub fn promoted(self) -> Self {
        match self {
            Stance::Hostile => Stance::Neutral,
            Stance::Neutral | Stance::Supportive => Stance::Supportive,
        }
    }

    pub fn demoted(self) -> Self {
        match self {
            Stance::Supportive => Stance::Neutral,
            Stance::Neutral | Stance::Hostile => Stance::Hostile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub party_id: String,
    pub stance: Stance,
    /// Share of the party's seats, in percent.
    pub size: f64,
    pub influence: f64,
    pub loyalty_to_leader: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    InVote,
    Passed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VoteTally {
    pub yes: u32,
    pub no: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub template_id: String,
    pub title: String,
    pub status: BillStatus,
    /// Fraction of total seats that must be exceeded, 0.5 for a simple majority.
    pub required_majority: f64,
    pub ideology: Option<Ideology>,
    pub effects: crate::simulation::StatDelta,
    pub proposed_on: GameDate,
    pub votes: Option<VoteTally>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parliament {
    pub parties: Vec<Party>,
    pub factions: Vec<Faction>,
    pub total_seats: u32,
    pub active_bill: Option<Bill>,
    pub government_support: f64,
    pub bills_failed_this_month: u32,
    pub bill_history: Vec<Bill>,
}

impl Parliament {
    pub fn new(parties: Vec<Party>, factions: Vec<Faction>) -> Self {
        let total_seats = parties.iter().map(|p| p.seats).sum();
        let mut parliament = Self {
            parties,
            factions,
            total_seats,
            active_bill: None,
            government_support: 0.0,
            bills_failed_this_month: 0,
            bill_history: Vec::new(),
        };
        parliament.government_support = crate::simulation::government_support(&parliament);
        parliament
    }

    pub fn party(&self, id: &str) -> Option<&Party> {
        self.parties.iter().find(|p| p.id == id)
    }

    pub fn government_seats(&self) -> u32 {
        self.parties
            .iter()
            .filter(|p| p.is_government)
            .map(|p| p.seats)
            .sum()
    }

    /// Seats a faction controls inside its party.
    pub fn faction_seats(&self, faction: &Faction) -> f64 {
        self.party(&faction.party_id)
            .map(|p| p.seats as f64 * faction.size.clamp(0.0, 100.0) / 100.0)
            .unwrap_or(0.0)
    }
}

impl Default for Parliament {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Government {
    pub ministers: Vec<Minister>,
    pub parliament: Parliament,
}

impl Government {
    pub fn minister(&self, ministry: Ministry) -> Option<&Minister> {
        self.ministers.iter().find(|m| m.ministry == ministry)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventsState {
    pub active_event: Option<PendingEvent>,
    pub situations: Vec<Situation>,
    /// Ids of every event that has fired, in firing order.
    pub history: Vec<String>,
    pub scheduled: Vec<ScheduledEvent>,
    pub story_vars: BTreeMap<String, StoryValue>,
    pub storylines: BTreeMap<String, StorylineProgress>,
}

impl EventsState {
    pub fn has_fired(&self, event_id: &str) -> bool {
        self.history.iter().any(|id| id == event_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Workers,
    Business,
    Farmers,
    Youth,
    Clergy,
    Military,
}

impl GroupKind {
    pub const ALL: [GroupKind; 6] = [
        GroupKind::Workers,
        GroupKind::Business,
        GroupKind::Farmers,
        GroupKind::Youth,
        GroupKind::Clergy,
        GroupKind::Military,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestGroup {
    pub kind: GroupKind,
    /// Millions of people.
    pub population_size: f64,
    pub power: f64,
    pub approval: f64,
    pub preferred_tax_rate: f64,
    /// Preferred public spending as a share of GDP.
    pub preferred_spending_share: f64,
}

impl InterestGroup {
    pub fn baseline(kind: GroupKind) -> Self {
        let (population_size, power, preferred_tax_rate, preferred_spending_share) = match kind {
            GroupKind::Workers => (4.0, 60.0, 0.30, 0.30),
            GroupKind::Business => (0.8, 80.0, 0.15, 0.12),
            GroupKind::Farmers => (1.5, 45.0, 0.20, 0.20),
            GroupKind::Youth => (2.0, 40.0, 0.28, 0.28),
            GroupKind::Clergy => (1.2, 50.0, 0.22, 0.18),
            GroupKind::Military => (0.5, 70.0, 0.25, 0.22),
        };
        Self {
            kind,
            population_size,
            power,
            approval: 50.0,
            preferred_tax_rate,
            preferred_spending_share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protest {
    pub group: GroupKind,
    pub intensity: f64,
    pub participants: f64,
    pub duration: u32,
    pub escalating: bool,
    pub started_on: GameDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaState {
    pub freedom: f64,
    pub support: f64,
    pub censorship: f64,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            freedom: 70.0,
            support: 50.0,
            censorship: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub momentum: f64,
    pub opposition_strength: f64,
    pub rallies_held: u32,
    pub started_on: GameDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SocialState {
    pub interest_groups: Vec<InterestGroup>,
    pub active_protests: BTreeMap<GroupKind, Protest>,
    pub media: MediaState,
    pub campaign: Option<Campaign>,
    pub approval_modifiers: Vec<ApprovalModifier>,
}

impl SocialState {
    pub fn group(&self, kind: GroupKind) -> Option<&InterestGroup> {
        self.interest_groups.iter().find(|g| g.kind == kind)
    }

    /// Shifts a group's approval and returns the delta that actually landed after clamping.
    pub fn adjust_approval(&mut self, kind: GroupKind, delta: f64) -> f64 {
        match self.interest_groups.iter_mut().find(|g| g.kind == kind) {
            Some(group) => {
                let before = group.approval;
                group.approval = clamp_percent(group.approval + delta);
                group.approval - before
            }
            None => 0.0,
        }
    }

    pub fn adjust_censorship(&mut self, delta: f64) {
        self.media.censorship = clamp_percent(self.media.censorship + delta);
    }

    pub fn adjust_media_freedom(&mut self, delta: f64) {
        self.media.freedom = clamp_percent(self.media.freedom + delta);
    }

    pub fn adjust_media_support(&mut self, delta: f64) {
        self.media.support = clamp_percent(self.media.support + delta);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTime {
    pub date: GameDate,
    pub start_date: GameDate,
    pub is_playing: bool,
    /// 0 = paused, 1..=3 = increasingly fast.
    pub speed: u8,
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            date: GameDate::default(),
            start_date: GameDate::default(),
            is_playing: false,
            speed: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub date: GameDate,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub dismissed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Economy,
    Politics,
    Social,
    Diplomacy,
    Event,
    Crisis,
    Project,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: GameDate,
    pub category: LogCategory,
    pub message: String,
}

/// Bounded chronicle of what happened; oldest entries fall off first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBook {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    /// Entries ever written, including the ones that fell off.
    total: u64,
}

impl LogBook {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1_024)),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        while self.entries.len() >= self.capacity.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.total += 1;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Entries written after the first `seen` ones, limited to what is still retained.
    pub fn since(&self, seen: u64) -> impl Iterator<Item = &LogEntry> {
        let fresh = self.total.saturating_sub(seen).min(self.entries.len() as u64) as usize;
        self.entries.iter().skip(self.entries.len() - fresh)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LogBook {
    fn default() -> Self {
        Self::new(256)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, Resource)]
pub struct GameState {
    pub player: Player,
    pub resources: Resources,
    pub stats: Stats,
    pub policies: Policies,
    pub diplomacy: DiplomacyState,
    pub government: Government,
    pub events: EventsState,
    pub social: SocialState,
    pub time: GameTime,
    pub notifications: Vec<Notification>,
    pub next_notification_id: u64,
    pub logs: LogBook,
}

impl GameState {
    pub fn is_started(&self) -> bool {
        !self.player.country_id.is_empty()
    }

    pub fn months_elapsed(&self) -> u32 {
        self.time.date.months_since(&self.time.start_date)
    }

    pub fn adjust_stability(&mut self, delta: f64) {
        self.resources.stability = clamp_percent(self.resources.stability + delta);
    }

    pub fn adjust_popularity(&mut self, delta: f64) {
        self.stats.popularity = clamp_percent(self.stats.popularity + delta);
    }

    pub fn set_popularity(&mut self, value: f64) {
        self.stats.popularity = clamp_percent(value);
    }

    pub fn adjust_unemployment(&mut self, delta: f64) {
        self.stats.unemployment =
            (self.stats.unemployment + delta).clamp(UNEMPLOYMENT_FLOOR, UNEMPLOYMENT_CEILING);
    }

    pub fn adjust_gdp(&mut self, delta: f64) {
        self.stats.gdp = (self.stats.gdp + delta).max(MIN_GDP);
    }

    pub fn set_gdp(&mut self, value: f64) {
        self.stats.gdp = value.max(MIN_GDP);
    }

    pub fn adjust_inflation(&mut self, delta: f64) {
        self.stats.inflation += delta;
    }

    pub fn adjust_budget(&mut self, delta: f64) {
        self.resources.budget += delta;
    }

    pub fn adjust_political_capital(&mut self, delta: f64) {
        self.resources.political_capital += delta;
    }

    pub fn spending_share(&self) -> f64 {
        self.policies.public_spending / self.stats.gdp.max(MIN_GDP)
    }

    pub fn log(&mut self, category: LogCategory, message: impl Into<String>) {
        let entry = LogEntry {
            date: self.time.date,
            category,
            message: message.into(),
        };
        self.logs.push(entry);
    }

    pub fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> u64 {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notifications.push(Notification {
            id,
            date: self.time.date,
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            dismissed: false,
        });
        id
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications
            .iter()
            .filter(|n| !n.read && !n.dismissed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjusters_clamp_at_the_mutation_site() {
        let mut state = GameState::default();
        state.adjust_stability(500.0);
        assert_eq!(state.resources.stability, 100.0);
        state.adjust_popularity(-500.0);
        assert_eq!(state.stats.popularity, 0.0);
        state.adjust_unemployment(1.0);
        assert_eq!(state.stats.unemployment, UNEMPLOYMENT_CEILING);
        state.adjust_unemployment(-1.0);
        assert_eq!(state.stats.unemployment, UNEMPLOYMENT_FLOOR);
        state.adjust_gdp(-1e9);
        assert_eq!(state.stats.gdp, MIN_GDP);
    }

    #[test]
    fn approval_adjustment_reports_landed_delta() {
        let mut social = SocialState {
            interest_groups: vec![InterestGroup::baseline(GroupKind::Workers)],
            ..Default::default()
        };
        social.interest_groups[0].approval = 95.0;
        assert_eq!(social.adjust_approval(GroupKind::Workers, 10.0), 5.0);
        assert_eq!(social.adjust_approval(GroupKind::Clergy, 10.0), 0.0);
    }

    #[test]
    fn log_book_drops_oldest_and_tracks_unseen() {
        let mut book = LogBook::new(2);
        for i in 0..3 {
            book.push(LogEntry {
                date: GameDate::default(),
                category: LogCategory::System,
                message: format!("entry {i}"),
            });
        }
        assert_eq!(book.len(), 2);
        assert_eq!(book.total(), 3);
        let unseen: Vec<_> = book.since(2).map(|e| e.message.as_str()).collect();
        assert_eq!(unseen, vec!["entry 2"]);
        assert_eq!(book.since(0).count(), 2);
    }

    #[test]
    fn notifications_get_increasing_ids() {
        let mut state = GameState::default();
        let first = state.notify(NotificationKind::Info, "a", "b");
        let second = state.notify(NotificationKind::Warning, "c", "d");
        assert!(second > first);
        assert_eq!(state.unread_notifications(), 2);
    }

    #[test]
    fn zero_capacity_log_book_still_bounds_itself() {
        let mut book: LogBook =
            serde_json::from_str(r#"{ "entries": [], "capacity": 0, "total": 0 }"#).expect("parses");
        for i in 0..5 {
            book.push(LogEntry {
                date: GameDate::default(),
                category: LogCategory::System,
                message: format!("entry {i}"),
            });
        }
        assert_eq!(book.len(), 1);
        assert_eq!(book.total(), 5);
    }
}
