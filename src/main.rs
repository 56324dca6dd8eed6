use std::collections::BTreeSet;
use std::env;
use std::fs;

use anyhow::{Context, bail};
use colored::{Color, Colorize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use statecraft::simulation::{
    Action, ContentLibrary, GameSession, GameState, GroupKind, Ideology, Notification, ProtestAction,
    Simulation, SimulationConfig, badge, group_label, ideology_label, notification_color,
    notification_label, snapshot,
};

const BUNDLED_CONTENT: &str = include_str!("../demos/content.json");

/// Protest intensity at which the autopilot sits down with the group.
const AUTOPILOT_PROTEST_THRESHOLD: f64 = 60.0;

#[derive(Clone, Copy)]
struct SpeedPreset {
    key: &'static str,
    label: &'static str,
    intent: &'static str,
    speed: u8,
}

const SPEED_PRESETS: [SpeedPreset; 3] = [
    SpeedPreset {
        key: "slow",
        label: "Deliberate",
        intent: "read every dispatch",
        speed: 1,
    },
    SpeedPreset {
        key: "normal",
        label: "Standard",
        intent: "balanced pace",
        speed: 2,
    },
    SpeedPreset {
        key: "fast",
        label: "Hurried",
        intent: "skim the years",
        speed: 3,
    },
];

struct RunOptions {
    country_id: String,
    ideology: Ideology,
    leader_name: String,
    preset: SpeedPreset,
    months: u32,
    seed: u64,
    save_path: Option<String>,
}

impl RunOptions {
    fn from_env() -> anyhow::Result<Self> {
        let preset_key = env::var("STATECRAFT_SPEED").unwrap_or_else(|_| "fast".to_string());
        let Some(preset) = SPEED_PRESETS.iter().find(|p| p.key == preset_key).copied() else {
            bail!("unknown speed preset `{preset_key}` (slow, normal, fast)");
        };
        Ok(Self {
            country_id: env::var("STATECRAFT_COUNTRY").unwrap_or_else(|_| "valoria".to_string()),
            ideology: parse_ideology(
                &env::var("STATECRAFT_IDEOLOGY").unwrap_or_else(|_| "liberal".to_string()),
            )?,
            leader_name: env::var("STATECRAFT_LEADER").unwrap_or_else(|_| "A. Novak".to_string()),
            preset,
            months: parse_var("STATECRAFT_MONTHS", 12)?,
            seed: parse_var("STATECRAFT_SEED", 7)?,
            save_path: env::var("STATECRAFT_SAVE").ok(),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a number, got `{raw}`")),
        Err(_) => Ok(default),
    }
}

fn parse_ideology(raw: &str) -> anyhow::Result<Ideology> {
    Ok(match raw.to_ascii_lowercase().as_str() {
        "socialist" => Ideology::Socialist,
        "liberal" => Ideology::Liberal,
        "conservative" => Ideology::Conservative,
        "nationalist" => Ideology::Nationalist,
        other => bail!("unknown ideology `{other}`"),
    })
}

fn load_config() -> anyhow::Result<SimulationConfig> {
    match env::var("STATECRAFT_CONFIG") {
        Ok(path) => {
            let text =
                fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))
        }
        Err(_) => Ok(SimulationConfig::default()),
    }
}

fn load_content() -> anyhow::Result<ContentLibrary> {
    match env::var("STATECRAFT_CONTENT") {
        Ok(path) => {
            let text =
                fs::read_to_string(&path).with_context(|| format!("reading content {path}"))?;
            ContentLibrary::from_json(&text).with_context(|| format!("parsing content {path}"))
        }
        Err(_) => ContentLibrary::from_json(BUNDLED_CONTENT).context("parsing bundled content"),
    }
}

/// Plays the decisions a hands-off leader would make and echoes new notifications.
struct Autopilot {
    seen_notifications: u64,
    answered_event: Option<(String, String)>,
    handled_protests: BTreeSet<(GroupKind, String)>,
}

impl Autopilot {
    fn new() -> Self {
        Self {
            seen_notifications: 0,
            answered_event: None,
            handled_protests: BTreeSet::new(),
        }
    }

    /// Notifications newer than the last echoed one; moves the watermark past them.
    fn take_unseen<'a>(&mut self, state: &'a GameState) -> Vec<&'a Notification> {
        let seen = self.seen_notifications;
        let fresh: Vec<&Notification> = state.notifications.iter().filter(|n| n.id > seen).collect();
        if let Some(newest) = fresh.iter().map(|n| n.id).max() {
            self.seen_notifications = newest;
        }
        fresh
    }

    fn observe(&mut self, session: &GameSession, state: &GameState) {
        for note in self.take_unseen(state) {
            info!(
                "{} {}: {}",
                badge(notification_label(note.kind), notification_color(note.kind)),
                note.title.bold(),
                note.message
            );
        }

        if let Some(event) = &state.events.active_event {
            let key = (event.event_id.clone(), event.fired_on.to_string());
            if self.answered_event.as_ref() != Some(&key) {
                let label = event.choices.first().map(|c| c.label.as_str()).unwrap_or("?");
                info!("{} {} -> {}", badge("Autopilot", Color::Cyan), event.title, label);
                session.submit(Action::ResolveEvent { choice: 0 });
                self.answered_event = Some(key);
            }
        }

        for (group, protest) in &state.social.active_protests {
            let key = (*group, state.time.date.to_string());
            if protest.intensity < AUTOPILOT_PROTEST_THRESHOLD
                || self.handled_protests.contains(&key)
            {
                continue;
            }
            let action = if state.resources.political_capital >= 20.0 {
                ProtestAction::Negotiate
            } else {
                ProtestAction::Ignore
            };
            info!(
                "{} {} protest at {:.0} intensity -> {:?}",
                badge("Autopilot", Color::Cyan),
                group_label(*group),
                protest.intensity,
                action
            );
            session.submit(Action::ResolveProtest {
                group: *group,
                action,
            });
            self.handled_protests.insert(key);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("statecraft=info")),
        )
        .init();

    let config = load_config()?;
    let content = load_content()?;
    let options = RunOptions::from_env()?;

    let mut simulation = Simulation::seeded(config, content, options.seed);
    let started = simulation
        .try_dispatch(
            &GameState::default(),
            Action::StartGame {
                country_id: options.country_id.clone(),
                ideology: options.ideology,
                leader_name: options.leader_name.clone(),
            },
        )
        .context("starting the game")?;
    let state = simulation.dispatch(
        &started,
        Action::SetSpeed {
            speed: options.preset.speed,
        },
    );
    info!(
        "{} {} leads {} at the head of a {} government ({} pace: {})",
        badge("Start", Color::BrightWhite),
        state.player.leader_name.bold(),
        state.player.country_name,
        ideology_label(state.player.ideology),
        options.preset.label,
        options.preset.intent
    );

    let session = GameSession::spawn(simulation, state);
    let mut updates = session.subscribe();
    let mut autopilot = Autopilot::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                warn!("interrupted, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                autopilot.observe(&session, &state);
                if state.months_elapsed() >= options.months {
                    break;
                }
            }
        }
    }

    let final_state = session.shutdown().await.context("session task failed")?;
    info!(
        "{} {} months governed, final popularity {:.0}, stability {:.0}",
        badge("End", Color::BrightWhite),
        final_state.months_elapsed(),
        final_state.stats.popularity,
        final_state.resources.stability
    );

    if let Some(path) = options.save_path {
        let text = snapshot::encode(&final_state)?;
        fs::write(&path, text).with_context(|| format!("writing snapshot {path}"))?;
        info!("snapshot saved to {path}");
    }
    Ok(())
}
