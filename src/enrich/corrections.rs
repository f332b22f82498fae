//! Source-specific event corrections.
//!
//! The play-by-play feed carries a few known conventions that have to be
//! undone before enrichment: blocked shots are attributed to the blocking
//! team with the blocker listed first, bench minors list the serving player
//! in the penalized slot, and faceoff player order follows the home/away
//! convention rather than winner-first. Each fix is a standalone pure
//! function.

use crate::model::{Event, EventPlayer, EventType, BENCH};

/// Blocked shots arrive from the blocking team's perspective: the acting
/// team is the blocker's team and player 1 is the blocker. Normalize so
/// player 1 is always the shooter, player 2 the blocker, and the acting
/// team is the shooting team.
pub fn fix_blocked_shot(event: &mut Event, home_team: &str, away_team: &str) {
    if event.event_type != EventType::Block {
        return;
    }
    std::mem::swap(&mut event.p1, &mut event.p2);
    event.team = if event.team == home_team {
        away_team.to_string()
    } else {
        home_team.to_string()
    };
}

/// A bench-served minor (too many men) lists the serving skater in the
/// penalized slot. Replace it with the BENCH sentinel and demote the
/// server to player 2.
pub fn fix_bench_minor(event: &mut Event) {
    if event.event_type != EventType::Penl {
        return;
    }
    let desc = event.description.to_uppercase();
    if !desc.contains("TOO MANY MEN") && !desc.contains("BENCH") {
        return;
    }
    let server = event.p1.take();
    event.p1 = Some(EventPlayer::new(BENCH, BENCH));
    event.p2 = server;
}

/// Faceoff slots are listed away player first, home player second. The
/// acting team is the winner, so when the home team wins the winner sits
/// in slot 2. Swap so player 1 is always the faceoff winner.
pub fn fix_faceoff_order(event: &mut Event, home_team: &str) {
    if event.event_type != EventType::Fac {
        return;
    }
    if event.team == home_team {
        std::mem::swap(&mut event.p1, &mut event.p2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::types::{GameId, Season, Session};

    fn event(event_type: EventType, team: &str, desc: &str) -> Event {
        Event {
            game_id: GameId::new(2023020001),
            season: Season::new(2023),
            session: Session::Regular,
            period: 1,
            period_seconds: 600,
            game_seconds: 600,
            event_index: 7,
            event_type,
            team: team.to_string(),
            p1: Some(EventPlayer::new("FIRST.PLAYER", "FIRST PLAYER")),
            p2: Some(EventPlayer::new("SECOND.PLAYER", "SECOND PLAYER")),
            p3: None,
            coords: None,
            description: desc.to_string(),
        }
    }

    #[test]
    fn test_blocked_shot_swaps_players_and_team() {
        let mut ev = event(EventType::Block, "BOS", "BOS #33 BLOCKED BY TOR #34");
        fix_blocked_shot(&mut ev, "BOS", "TOR");
        assert_eq!(ev.team, "TOR");
        assert_eq!(ev.p1.as_ref().unwrap().key, "SECOND.PLAYER");
        assert_eq!(ev.p2.as_ref().unwrap().key, "FIRST.PLAYER");
    }

    #[test]
    fn test_blocked_shot_fix_ignores_other_events() {
        let mut ev = event(EventType::Shot, "BOS", "wrist shot");
        fix_blocked_shot(&mut ev, "BOS", "TOR");
        assert_eq!(ev.team, "BOS");
        assert_eq!(ev.p1.as_ref().unwrap().key, "FIRST.PLAYER");
    }

    #[test]
    fn test_bench_minor_substitutes_sentinel() {
        let mut ev = event(
            EventType::Penl,
            "BOS",
            "BOS TEAM Too many men/ice - bench(2 min) Served By: #46 FIRST PLAYER",
        );
        fix_bench_minor(&mut ev);
        assert_eq!(ev.p1.as_ref().unwrap().key, BENCH);
        assert_eq!(ev.p2.as_ref().unwrap().key, "FIRST.PLAYER");
    }

    #[test]
    fn test_regular_minor_untouched() {
        let mut ev = event(EventType::Penl, "BOS", "BOS #88 Tripping(2 min)");
        fix_bench_minor(&mut ev);
        assert_eq!(ev.p1.as_ref().unwrap().key, "FIRST.PLAYER");
        assert_eq!(ev.p2.as_ref().unwrap().key, "SECOND.PLAYER");
    }

    #[test]
    fn test_home_faceoff_win_swapped() {
        let mut ev = event(EventType::Fac, "BOS", "BOS won Neu. Zone");
        fix_faceoff_order(&mut ev, "BOS");
        assert_eq!(ev.p1.as_ref().unwrap().key, "SECOND.PLAYER");
    }

    #[test]
    fn test_away_faceoff_win_untouched() {
        let mut ev = event(EventType::Fac, "TOR", "TOR won Off. Zone");
        fix_faceoff_order(&mut ev, "BOS");
        assert_eq!(ev.p1.as_ref().unwrap().key, "FIRST.PLAYER");
    }
}
