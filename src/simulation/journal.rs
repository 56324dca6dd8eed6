//! Display labels, colors and badge lines for the chronicle.

use colored::{Color, Colorize};

use crate::simulation::{
    GameState, GroupKind, Ideology, LogCategory, LogEntry, NotificationKind,
};

pub fn category_label(category: LogCategory) -> &'static str {
    match category {
        LogCategory::Economy => "Economy",
        LogCategory::Politics => "Politics",
        LogCategory::Social => "Social",
        LogCategory::Diplomacy => "Diplomacy",
        LogCategory::Event => "Event",
        LogCategory::Crisis => "Crisis",
        LogCategory::Project => "Project",
        LogCategory::System => "System",
    }
}

pub fn category_color(category: LogCategory) -> Color {
    match category {
        LogCategory::Economy => Color::BrightYellow,
        LogCategory::Politics => Color::BrightBlue,
        LogCategory::Social => Color::BrightMagenta,
        LogCategory::Diplomacy => Color::BrightCyan,
        LogCategory::Event => Color::White,
        LogCategory::Crisis => Color::BrightRed,
        LogCategory::Project => Color::Green,
        LogCategory::System => Color::BrightBlack,
    }
}

pub fn notification_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "Info",
        NotificationKind::Success => "Success",
        NotificationKind::Warning => "Warning",
        NotificationKind::Danger => "Danger",
    }
}

pub fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Info => Color::Blue,
        NotificationKind::Success => Color::BrightGreen,
        NotificationKind::Warning => Color::Yellow,
        NotificationKind::Danger => Color::BrightRed,
    }
}

pub fn ideology_label(ideology: Ideology) -> &'static str {
    match ideology {
        Ideology::Socialist => "Socialist",
        Ideology::Liberal => "Liberal",
        Ideology::Conservative => "Conservative",
        Ideology::Nationalist => "Nationalist",
    }
}

pub fn group_label(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Workers => "Workers",
        GroupKind::Business => "Business",
        GroupKind::Farmers => "Farmers",
        GroupKind::Youth => "Youth",
        GroupKind::Clergy => "Clergy",
        GroupKind::Military => "Military",
    }
}

/// Green when comfortable, yellow when shaky, red when failing.
pub fn gauge_color(value: f64) -> Color {
    if value >= 60.0 {
        Color::BrightGreen
    } else if value >= 35.0 {
        Color::Yellow
    } else {
        Color::BrightRed
    }
}

pub fn format_number_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn badge(label: &str, color: Color) -> String {
    format!("[{label}]").color(color).to_string()
}

pub fn format_entry_line(entry: &LogEntry) -> String {
    format!(
        "{} {} {}",
        badge(category_label(entry.category), category_color(entry.category)),
        badge(&entry.date.to_string(), Color::BrightBlack),
        entry.message
    )
}

/// One-line overview of the nation, printed once a month.
pub fn format_status_line(state: &GameState) -> String {
    let stability = state.resources.stability;
    let popularity = state.stats.popularity;
    let mut line = format!(
        "{} {} {} | gdp {:.0}B ({} people) | budget {:+.1}B | capital {:.0} | stability {} | popularity {} | inflation {:.1}% | unemployment {:.1}%",
        badge("Status", Color::BrightWhite),
        badge(&state.time.date.to_string(), Color::BrightBlack),
        state.player.country_name.bold(),
        state.stats.gdp,
        format_number_commas(state.stats.population),
        state.resources.budget,
        state.resources.political_capital,
        format!("{stability:.0}").color(gauge_color(stability)),
        format!("{popularity:.0}").color(gauge_color(popularity)),
        state.stats.inflation * 100.0,
        state.stats.unemployment * 100.0,
    );
    for situation in &state.events.situations {
        let color = if situation.exploded {
            Color::Red
        } else {
            Color::BrightRed
        };
        line.push(' ');
        line.push_str(&badge(situation.kind.title(), color));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_number_commas(0), "0");
        assert_eq!(format_number_commas(999), "999");
        assert_eq!(format_number_commas(1_000), "1,000");
        assert_eq!(format_number_commas(10_000_000), "10,000,000");
    }

    #[test]
    fn entry_line_carries_category_and_date() {
        colored::control::set_override(false);
        let entry = LogEntry {
            date: crate::simulation::GameDate::new(2024, 3, 9),
            category: LogCategory::Crisis,
            message: "Insurgency has broken out".into(),
        };
        assert_eq!(
            format_entry_line(&entry),
            "[Crisis] [2024-03-09] Insurgency has broken out"
        );
    }
}
