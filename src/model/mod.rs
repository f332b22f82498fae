//! Core data model: events, shifts, on-ice state.
//!
//! Organized into logical components:
//! - `event`: play-by-play event rows, raw and normalized
//! - `shift`: shift rows, raw and normalized, plus roster lookups
//! - `state`: derived on-ice state attached to every enriched event

pub mod event;
pub mod shift;
pub mod state;

pub use event::{Event, EventPlayer, EventType, RawEventRow, RawPlayer};
pub use shift::{GameMeta, PositionGroup, RawShiftRow, RosterEntry, Shift};
pub use state::{AdjustedStats, Danger, EnrichedEvent, OnIceSide, OnPlayer, Zone};

use crate::cli::types::Session;

/// Sentinel for a bench-served minor with no penalized skater.
pub const BENCH: &str = "BENCH";

/// Seconds in a regulation period.
pub const REGULATION_PERIOD_SECONDS: u32 = 1200;

/// Length in seconds of a given period number under the session's rules.
///
/// Periods 1-3 are always 20 minutes. Period 4 is overtime; periods 5+ are
/// further playoff overtimes, or the shootout in other sessions, whose
/// time accounting is configurable rather than fixed (`shootout_seconds`).
pub fn period_length(period: u8, session: Session, shootout_seconds: u32) -> u32 {
    match period {
        1..=3 => REGULATION_PERIOD_SECONDS,
        4 => session.overtime_seconds(),
        _ => match session {
            Session::Playoffs => REGULATION_PERIOD_SECONDS,
            _ => shootout_seconds,
        },
    }
}

/// Cumulative game seconds elapsed before the given period starts.
pub fn period_start_game_seconds(period: u8, session: Session, shootout_seconds: u32) -> u32 {
    (1..period)
        .map(|p| period_length(p, session, shootout_seconds))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_length_regulation() {
        for p in 1..=3 {
            assert_eq!(period_length(p, Session::Regular, 0), 1200);
            assert_eq!(period_length(p, Session::Playoffs, 0), 1200);
        }
    }

    #[test]
    fn test_period_length_overtime() {
        assert_eq!(period_length(4, Session::Regular, 0), 300);
        assert_eq!(period_length(4, Session::Preseason, 0), 300);
        assert_eq!(period_length(4, Session::Playoffs, 0), 1200);
    }

    #[test]
    fn test_period_length_shootout_is_configurable() {
        assert_eq!(period_length(5, Session::Regular, 0), 0);
        assert_eq!(period_length(5, Session::Regular, 300), 300);
        // Playoff "period 5" is double overtime, never a shootout.
        assert_eq!(period_length(5, Session::Playoffs, 0), 1200);
    }

    #[test]
    fn test_period_start_game_seconds() {
        assert_eq!(period_start_game_seconds(1, Session::Regular, 0), 0);
        assert_eq!(period_start_game_seconds(3, Session::Regular, 0), 2400);
        assert_eq!(period_start_game_seconds(4, Session::Regular, 0), 3600);
        assert_eq!(period_start_game_seconds(5, Session::Regular, 0), 3900);
        assert_eq!(period_start_game_seconds(5, Session::Playoffs, 0), 4800);
    }
}
