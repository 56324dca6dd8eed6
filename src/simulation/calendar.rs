//! In-game calendar. One simulated tick advances the date by a single day.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameDate {
    pub year: i32,
    pub month: u8, // 1-12
    pub day: u8,   // 1-31
}

impl GameDate {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        let month = month.clamp(1, 12);
        let day = day.clamp(1, days_in_month(year, month));
        Self { year, month, day }
    }

    pub fn next_day(&self) -> Self {
        if self.day < days_in_month(self.year, self.month) {
            return Self {
                day: self.day + 1,
                ..*self
            };
        }
        if self.month < 12 {
            Self {
                year: self.year,
                month: self.month + 1,
                day: 1,
            }
        } else {
            Self {
                year: self.year + 1,
                month: 1,
                day: 1,
            }
        }
    }

    pub fn add_days(&self, days: u32) -> Self {
        (0..days).fold(*self, |date, _| date.next_day())
    }

    /// True when `other` falls in a different calendar month.
    pub fn crosses_month(&self, other: &GameDate) -> bool {
        self.year != other.year || self.month != other.month
    }

    /// Whole calendar months between `start` and `self`; zero when `start` is later.
    pub fn months_since(&self, start: &GameDate) -> u32 {
        let months = (self.year - start.year) * 12 + self.month as i32 - start.month as i32;
        let months = if self.day < start.day { months - 1 } else { months };
        months.max(0) as u32
    }
}

impl Default for GameDate {
    fn default() -> Self {
        Self::new(2024, 1, 1)
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}
