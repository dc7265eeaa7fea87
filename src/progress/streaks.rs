//! Streak tracking system
//!
//! Tracks the daily activity streak. Days are compared as user-local calendar
//! dates; the time of day never participates.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, NaiveDate};

/// Storage format for activity dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format written by older clients (`Date.toDateString()`, e.g. "Sun Oct 18 2026")
const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y";

/// Source of "today" for the streak tracker
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that only moves when told to. Share it through `Rc` to keep a handle
/// after giving it to an engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    today: Cell<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Cell::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        self.today.set(today);
    }

    /// Move forward by `days` calendar days
    pub fn advance_days(&self, days: u64) {
        let next = self
            .today
            .get()
            .checked_add_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.today.set(next);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Outcome of feeding one activity day into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// Activity already counted for this day
    Unchanged,
    /// Activity on the day after the last one
    Continued { streak: u32 },
    /// First activity ever, or a gap of more than one day
    Reset,
}

impl StreakTransition {
    /// Whether this transition earns the daily streak bonus
    pub fn earns_bonus(&self) -> bool {
        matches!(self, Self::Continued { .. })
    }
}

/// Compute the streak transition for an activity on `today`
pub fn next_transition(
    last_activity: Option<NaiveDate>,
    streak: u32,
    today: NaiveDate,
) -> StreakTransition {
    let Some(last) = last_activity else {
        return StreakTransition::Reset;
    };

    // A clock that went backwards counts as the same day
    if today <= last {
        return StreakTransition::Unchanged;
    }

    if last.succ_opt() == Some(today) {
        StreakTransition::Continued {
            streak: streak.saturating_add(1),
        }
    } else {
        StreakTransition::Reset
    }
}

/// Streak fields of the progression state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    pub current: u32,
    pub last_activity: Option<NaiveDate>,
}

impl StreakState {
    /// Record activity on `today`, returning the transition that was applied
    pub fn record_activity(&mut self, today: NaiveDate) -> StreakTransition {
        let transition = next_transition(self.last_activity, self.current, today);
        match transition {
            StreakTransition::Unchanged => {}
            StreakTransition::Continued { streak } => {
                self.current = streak;
                self.last_activity = Some(today);
            }
            StreakTransition::Reset => {
                self.current = 1;
                self.last_activity = Some(today);
            }
        }
        transition
    }
}

/// Format a date for storage
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored activity date. Empty or unrecognised values mean "no activity".
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, LEGACY_DATE_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let mut streak = StreakState::default();
        let t = streak.record_activity(day(2026, 3, 1));
        assert_eq!(t, StreakTransition::Reset);
        assert_eq!(streak.current, 1);
        assert_eq!(streak.last_activity, Some(day(2026, 3, 1)));
    }

    #[test]
    fn test_consecutive_days() {
        let mut streak = StreakState::default();
        streak.record_activity(day(2026, 2, 27));
        streak.record_activity(day(2026, 2, 28));
        let t = streak.record_activity(day(2026, 3, 1));
        assert_eq!(t, StreakTransition::Continued { streak: 3 });
        assert!(t.earns_bonus());
        assert_eq!(streak.current, 3);
    }

    #[test]
    fn test_same_day_is_unchanged() {
        let mut streak = StreakState::default();
        streak.record_activity(day(2026, 3, 1));
        let t = streak.record_activity(day(2026, 3, 1));
        assert_eq!(t, StreakTransition::Unchanged);
        assert!(!t.earns_bonus());
        assert_eq!(streak.current, 1);
    }

    #[test]
    fn test_gap_resets() {
        let mut streak = StreakState::default();
        streak.record_activity(day(2026, 3, 1));
        streak.record_activity(day(2026, 3, 2));
        let t = streak.record_activity(day(2026, 3, 7));
        assert_eq!(t, StreakTransition::Reset);
        assert_eq!(streak.current, 1);
        assert_eq!(streak.last_activity, Some(day(2026, 3, 7)));
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut streak = StreakState {
            current: 4,
            last_activity: Some(day(2026, 3, 10)),
        };
        let t = streak.record_activity(day(2026, 3, 9));
        assert_eq!(t, StreakTransition::Unchanged);
        assert_eq!(streak.current, 4);
        assert_eq!(streak.last_activity, Some(day(2026, 3, 10)));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2026-10-18"), Some(day(2026, 10, 18)));
        assert_eq!(parse_date("Sun Oct 18 2026"), Some(day(2026, 10, 18)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(format_date(day(2026, 1, 5)), "2026-01-05");
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = Rc::new(ManualClock::new(day(2026, 12, 31)));
        let shared: Rc<ManualClock> = Rc::clone(&clock);
        clock.advance_days(1);
        assert_eq!(shared.today(), day(2027, 1, 1));
    }
}
