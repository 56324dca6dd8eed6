use std::mem;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, Schedule};
use rand::RngCore;
use tracing::{debug, info, warn};

pub mod actions;
pub mod cabinet;
pub mod calendar;
pub mod conditions;
pub mod config;
pub mod content;
pub mod dice;
pub mod diplomacy;
pub mod economy;
pub mod effects;
pub mod events;
pub mod game;
pub mod journal;
pub mod parliament;
pub mod projects;
pub mod scheduler;
pub mod session;
pub mod situations;
pub mod snapshot;
pub mod social;
pub mod state;
pub mod storyline;
pub mod systems;
pub mod testing;

pub use actions::*;
pub use cabinet::*;
pub use calendar::*;
pub use conditions::*;
pub use config::*;
pub use content::*;
pub use dice::Dice;
pub use diplomacy::*;
pub use economy::*;
pub use effects::*;
pub use events::*;
pub use game::*;
pub use journal::*;
pub use parliament::*;
pub use projects::*;
pub use scheduler::*;
pub use session::*;
pub use situations::*;
pub use snapshot::{SNAPSHOT_VERSION, SnapshotError};
pub use social::*;
pub use state::*;
pub use storyline::*;
pub use systems::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Daily,
    Monthly,
}

/// The reducer. Owns the ECS world that holds configuration, content and
/// the random source, plus the daily and monthly schedules.
///
/// State never lives in the world between calls: each phase moves the
/// snapshot in, runs its chained systems and moves it back out.
pub struct Simulation {
    world: World,
    daily: Schedule,
    monthly: Schedule,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        content: ContentLibrary,
        rng: Box<dyn RngCore + Send + Sync>,
    ) -> Self {
        let mut world = World::default();
        world.insert_resource(config);
        world.insert_resource(content);
        world.insert_resource(Dice(rng));
        world.insert_resource(JournalCursor::default());

        let mut daily = Schedule::default();
        daily.set_executor_kind(ExecutorKind::SingleThreaded);
        daily.add_systems(
            (
                calendar_system,
                scheduled_event_system,
                protest_system,
                situation_system,
                storyline_system,
                event_roll_system,
                journal_system,
            )
                .chain(),
        );

        let mut monthly = Schedule::default();
        monthly.set_executor_kind(ExecutorKind::SingleThreaded);
        monthly.add_systems(
            (
                economy_system,
                cabinet_system,
                interest_group_system,
                media_system,
                campaign_system,
                parliament_system,
                project_system,
                diplomacy_system,
                journal_system,
                status_system,
            )
                .chain(),
        );

        Self {
            world,
            daily,
            monthly,
        }
    }

    pub fn seeded(config: SimulationConfig, content: ContentLibrary, seed: u64) -> Self {
        let Dice(rng) = Dice::seeded(seed);
        Self::new(config, content, rng)
    }

    pub fn config(&self) -> &SimulationConfig {
        self.world.resource::<SimulationConfig>()
    }

    pub fn content(&self) -> &ContentLibrary {
        self.world.resource::<ContentLibrary>()
    }

    /// Applies an action and returns the next snapshot. A rejected action
    /// yields an unchanged copy of `state`.
    pub fn dispatch(&mut self, state: &GameState, action: Action) -> GameState {
        let name = action.name();
        match self.try_dispatch(state, action) {
            Ok(next) => next,
            Err(rejection) => {
                warn!(action = name, %rejection, "action rejected");
                state.clone()
            }
        }
    }

    pub fn try_dispatch(&mut self, state: &GameState, action: Action) -> Result<GameState, Rejection> {
        let name = action.name();
        let mut next = state.clone();
        self.handle(&mut next, action)?;
        debug!(action = name, date = %next.time.date, "action applied");
        Ok(next)
    }

    fn handle(&mut self, state: &mut GameState, action: Action) -> Result<(), Rejection> {
        let needs_game = !matches!(action, Action::StartGame { .. } | Action::LoadSnapshot { .. });
        if needs_game && !state.is_started() {
            return Err(Rejection::NoGameInProgress);
        }

        match action {
            Action::StartGame {
                country_id,
                ideology,
                leader_name,
            } => {
                let fresh = self.with_context(|ctx, _| {
                    let template = ctx
                        .content
                        .country(&country_id)
                        .ok_or_else(|| Rejection::unknown("country template", &country_id))?;
                    Ok(new_game(template, ideology, &leader_name, ctx.config))
                })?;
                info!(country = %country_id, leader = %leader_name, ?ideology, "game started");
                *state = fresh;
                self.world.resource_mut::<JournalCursor>().0 = 0;
            }
            Action::AdvanceDay => {
                if state.events.active_event.is_some() {
                    return Err(Rejection::EventPending);
                }
                self.run_phase(Phase::Daily, state)?;
            }
            Action::AdvanceMonth => self.run_phase(Phase::Monthly, state)?,
            Action::SetSpeed { speed } => {
                if speed > 3 {
                    return Err(Rejection::precondition(format!("speed {speed} out of range 0..=3")));
                }
                state.time.speed = speed;
                state.time.is_playing = speed > 0;
            }
            Action::TogglePause => {
                state.time.is_playing = !state.time.is_playing;
                if state.time.is_playing && state.time.speed == 0 {
                    state.time.speed = 1;
                }
            }
            Action::SetPolicy { lever } => set_policy(state, lever)?,
            Action::ResolveEvent { choice } => {
                self.with_context(|ctx, _| resolve_active_event(state, ctx.content, choice))?
            }
            Action::Diplomacy { country_id, action } => self.with_context(|ctx, _| {
                apply_diplomatic_action(state, &country_id, action, ctx.config)
            })?,
            Action::AppointMinister {
                candidate_id,
                ministry,
            } => self.with_context(|ctx, _| {
                appoint_minister(
                    state,
                    ctx.content,
                    &candidate_id,
                    ministry,
                    ctx.config.minister_dismissal_factor,
                )
            })?,
            Action::FireMinister { ministry } => self.with_context(|ctx, _| {
                fire_minister(state, ministry, ctx.config.minister_dismissal_factor)
            })?,
            Action::ProposeBill { template_id } => self.with_context(|ctx, _| {
                let template = ctx
                    .content
                    .bill(&template_id)
                    .ok_or_else(|| Rejection::unknown("bill template", &template_id))?;
                propose_bill(state, template, ctx.config.bill_proposal_cost)
            })?,
            Action::TriggerVote => {
                self.with_context(|_, rng| trigger_vote(state, rng))?;
            }
            Action::NegotiateWithFaction {
                faction_id,
                capital,
            } => {
                self.with_context(|ctx, rng| {
                    negotiate_with_faction(
                        state,
                        &faction_id,
                        capital,
                        ctx.config.faction_negotiation_success,
                        rng,
                    )
                })?;
            }
            Action::OpenNotification { id } => notification(state, id)?.read = true,
            Action::DismissNotification { id } => notification(state, id)?.dismissed = true,
            Action::ResolveProtest { group, action } => {
                self.with_context(|_, rng| handle_protest(state, group, action, rng))?;
            }
            Action::CensorMedia => censor_media(state),
            Action::FundPublicMedia { amount } => fund_public_media(state, amount)?,
            Action::StartCampaign => start_campaign(state)?,
            Action::HoldRally { budget } => {
                hold_rally(state, budget)?;
            }
            Action::SmearCampaign => {
                self.with_context(|_, rng| smear_campaign(state, rng))?;
            }
            Action::StartProject { template_id } => self.with_context(|ctx, _| {
                let template = ctx
                    .content
                    .project(&template_id)
                    .ok_or_else(|| Rejection::unknown("project template", &template_id))?;
                start_project(state, template)
            })?,
            Action::RespondToSituation {
                situation_id,
                allocation,
            } => {
                self.with_context(|ctx, _| {
                    respond_to_situation(
                        state,
                        &situation_id,
                        &allocation,
                        ctx.config.emergency_response_cost,
                    )
                })?;
            }
            Action::LoadSnapshot { state: loaded } => {
                info!(date = %loaded.time.date, country = %loaded.player.country_id, "snapshot loaded");
                *state = *loaded;
                self.world.resource_mut::<JournalCursor>().0 = state.logs.total();
            }
        }
        Ok(())
    }

    /// Runs `f` with read access to config and content and the world's random source.
    fn with_context<T>(&mut self, f: impl FnOnce(&ActionContext<'_>, &mut dyn RngCore) -> T) -> T {
        self.world.resource_scope(|world, mut dice: Mut<Dice>| {
            let ctx = ActionContext {
                config: world.resource::<SimulationConfig>(),
                content: world.resource::<ContentLibrary>(),
            };
            f(&ctx, dice.rng())
        })
    }

    fn run_phase(&mut self, phase: Phase, state: &mut GameState) -> Result<(), Rejection> {
        {
            let mut cursor = self.world.resource_mut::<JournalCursor>();
            cursor.0 = cursor.0.min(state.logs.total());
        }
        self.world.insert_resource(mem::take(state));
        match phase {
            Phase::Daily => self.daily.run(&mut self.world),
            Phase::Monthly => self.monthly.run(&mut self.world),
        }
        *state = self
            .world
            .remove_resource::<GameState>()
            .ok_or_else(|| Rejection::precondition("game state went missing during the update"))?;
        Ok(())
    }
}

fn set_policy(state: &mut GameState, lever: PolicyLever) -> Result<(), Rejection> {
    match lever {
        PolicyLever::TaxRate(rate) if rate.is_finite() => {
            state.policies.tax_rate = rate.clamp(0.0, 1.0);
            state.log(
                LogCategory::Economy,
                format!("Tax rate set to {:.0}%", state.policies.tax_rate * 100.0),
            );
        }
        PolicyLever::PublicSpending(amount) if amount.is_finite() => {
            state.policies.public_spending = amount.max(0.0);
            state.log(
                LogCategory::Economy,
                format!("Public spending set to {:.1}B", state.policies.public_spending),
            );
        }
        _ => return Err(Rejection::precondition("policy value must be a finite number")),
    }
    Ok(())
}

fn notification(state: &mut GameState, id: u64) -> Result<&mut Notification, Rejection> {
    state
        .notifications
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| Rejection::unknown("notification", id.to_string()))
}
