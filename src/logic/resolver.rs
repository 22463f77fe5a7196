//! Match resolution: applies results, cascades placeholder resolution and bye
//! auto-advances, and keeps the seed-position table current.

use crate::logic::standings;
use crate::models::{
    GameMatch, MatchId, MatchResult, MatchStatus, ParticipantRef, SeedState, SourceRole,
    Tournament, TournamentError, TournamentStatus,
};
use std::collections::{BTreeMap, HashMap};

/// Apply a result to a ready (or live) match, resolve every downstream
/// placeholder that referenced it, and recompute match statuses. Returns
/// whether the tournament completed with this result.
///
/// The call is atomic: it works on a copy and commits only when the whole
/// cascade succeeds, so callers never observe a partially-resolved topology.
pub fn apply_match_result(
    t: &mut Tournament,
    match_id: MatchId,
    result: MatchResult,
) -> Result<bool, TournamentError> {
    {
        // Match-level checks come first so a resubmission against a finished
        // match reports AlreadyCompleted rather than a stale tournament state.
        let m = t
            .get_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if m.status.is_terminal() {
            return Err(TournamentError::AlreadyCompleted(match_id));
        }
        if m.status == MatchStatus::Pending {
            return Err(TournamentError::NotReady(match_id));
        }
        if t.status != TournamentStatus::Active {
            return Err(TournamentError::InvalidState);
        }
        validate_result(t, m, &result)?;
    }
    let mut work = t.clone();

    let walkover = result.walkover;
    let m = work
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    m.status = if walkover {
        MatchStatus::Walkover
    } else {
        MatchStatus::Completed
    };
    m.result = Some(result);

    settle(&mut work)?;
    work.state = rebuild_seed_state(&work);

    let complete = work.all_matches_terminal();
    if complete {
        work.status = TournamentStatus::Completed;
    }
    *t = work;
    Ok(complete)
}

/// Check a submitted result against the match's resolved slots and the
/// tournament's match rules.
fn validate_result(
    t: &Tournament,
    m: &GameMatch,
    result: &MatchResult,
) -> Result<(), TournamentError> {
    let (a, b) = match (
        m.participant_a.participant_id(),
        m.participant_b.participant_id(),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(TournamentError::NotReady(m.id)),
    };
    let sides_match = (result.winner_id == a && result.loser_id == b)
        || (result.winner_id == b && result.loser_id == a);
    if !sides_match {
        return Err(TournamentError::InvalidInput(
            "winner/loser do not match the participants of this match".to_string(),
        ));
    }
    if result.walkover {
        if !t.config.allow_walkovers {
            return Err(TournamentError::InvalidInput(
                "walkovers are not allowed in this tournament".to_string(),
            ));
        }
        if !result.game_scores.is_empty() {
            return Err(TournamentError::InvalidInput(
                "a walkover result must not carry game scores".to_string(),
            ));
        }
        return Ok(());
    }
    let best_of = t.config.match_rules.best_of as usize;
    if result.game_scores.len() > best_of {
        return Err(TournamentError::InvalidInput(format!(
            "{} games exceeds best of {}",
            result.game_scores.len(),
            best_of
        )));
    }
    if !result.game_scores.is_empty() {
        let mut winner_games = 0u32;
        let mut loser_games = 0u32;
        for g in &result.game_scores {
            if g.player1 == g.player2 {
                return Err(TournamentError::InvalidInput(
                    "a game cannot be drawn".to_string(),
                ));
            }
            let side_a_won = g.player1 > g.player2;
            let winner_is_a = result.winner_id == a;
            if side_a_won == winner_is_a {
                winner_games += 1;
            } else {
                loser_games += 1;
            }
        }
        // Retirements may leave the winner behind on games; otherwise the
        // winner must have taken the majority.
        if winner_games <= loser_games && !result.retired {
            return Err(TournamentError::InvalidInput(
                "winner did not take the majority of games".to_string(),
            ));
        }
    }
    Ok(())
}

/// Run the resolution cascade to a fixed point: propagate winner/loser refs
/// from decided matches, resolve group qualifiers once a group finishes,
/// auto-advance byes, and flip fully-resolved matches to ready.
pub(crate) fn settle(t: &mut Tournament) -> Result<(), TournamentError> {
    loop {
        let mut changed = false;

        // Winner/loser refs from every decided match.
        let decided: HashMap<MatchId, (ParticipantRef, ParticipantRef)> = t
            .matches
            .iter()
            .filter(|m| m.status.is_terminal())
            .filter_map(|m| match (m.winner_ref(), m.loser_ref()) {
                (Some(w), Some(l)) => Some((m.id, (w, l))),
                _ => None,
            })
            .collect();

        // Group finishing orders, for groups whose matches are all terminal.
        let mut group_orders: HashMap<uuid::Uuid, Vec<ParticipantRef>> = HashMap::new();
        for g in &t.groups {
            let done = g
                .match_ids
                .iter()
                .all(|id| t.get_match(*id).map_or(false, |m| m.status.is_terminal()));
            if done {
                let order = standings::rank_group_participants(t, g)
                    .into_iter()
                    .map(ParticipantRef::participant)
                    .collect();
                group_orders.insert(g.id, order);
            }
        }

        for m in &mut t.matches {
            if m.status.is_terminal() {
                continue;
            }
            for slot in [&mut m.participant_a, &mut m.participant_b] {
                let replacement = match slot {
                    ParticipantRef::SeedPosition {
                        source_match_id,
                        source_role,
                        ..
                    } => decided.get(source_match_id).map(|(w, l)| match source_role {
                        SourceRole::Winner => w.clone(),
                        SourceRole::Loser => l.clone(),
                    }),
                    ParticipantRef::GroupPosition { group_id, position } => {
                        group_orders.get(group_id).map(|order| {
                            order
                                .get(*position as usize - 1)
                                .cloned()
                                .unwrap_or(ParticipantRef::Bye)
                        })
                    }
                    _ => None,
                };
                if let Some(r) = replacement {
                    *slot = r;
                    changed = true;
                }
            }
        }

        // Status transitions for fully-resolved matches.
        for m in &mut t.matches {
            if m.status != MatchStatus::Pending {
                continue;
            }
            if !(m.participant_a.is_concrete() && m.participant_b.is_concrete()) {
                continue;
            }
            match (m.participant_a.is_bye(), m.participant_b.is_bye()) {
                (false, false) => m.status = MatchStatus::Ready,
                // Bye auto-advance: completed without play or a recorded result.
                (true, false) | (false, true) => {
                    m.status = MatchStatus::Completed;
                    changed = true;
                }
                (true, true) => {
                    m.status = MatchStatus::Cancelled;
                    changed = true;
                }
            }
        }

        if !changed {
            return Ok(());
        }
    }
}

/// Rebuild the seed-position → occupant table from the match list alone.
/// Matches are replayed in round order; a decided match overwrites its two
/// positions with the winner (lower position) and loser (higher position).
/// Only concrete refs enter the table, so every entry is a participant or bye.
pub fn rebuild_seed_state(t: &Tournament) -> SeedState {
    let mut positions: BTreeMap<u32, ParticipantRef> = BTreeMap::new();
    let mut bracket: Vec<&GameMatch> = t
        .matches
        .iter()
        .filter(|m| m.position_a.is_some() && m.position_b.is_some())
        .collect();
    bracket.sort_by_key(|m| (m.round, m.match_number));

    for m in bracket {
        let (pos_a, pos_b) = match (m.position_a, m.position_b) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        if m.participant_a.is_concrete() {
            positions.insert(pos_a, m.participant_a.clone());
        }
        if m.participant_b.is_concrete() {
            positions.insert(pos_b, m.participant_b.clone());
        }
        if let (Some(w), Some(l)) = (m.winner_ref(), m.loser_ref()) {
            let lo = pos_a.min(pos_b);
            let hi = pos_a.max(pos_b);
            positions.insert(lo, w);
            positions.insert(hi, l);
        }
    }

    SeedState {
        seed_positions: positions,
        bracket_size: t.state.bracket_size,
    }
}

/// Matches currently eligible for play.
pub fn playable_matches(t: &Tournament) -> Vec<&GameMatch> {
    t.matches
        .iter()
        .filter(|m| m.status == MatchStatus::Ready)
        .collect()
}

/// Mark a ready match as in progress. Advisory only.
pub fn start_match(t: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    let m = t
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    match m.status {
        MatchStatus::Ready => {
            m.status = MatchStatus::Live;
            Ok(())
        }
        MatchStatus::Pending => Err(TournamentError::NotReady(match_id)),
        _ => Err(TournamentError::AlreadyCompleted(match_id)),
    }
}
