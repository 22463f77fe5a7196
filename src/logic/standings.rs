//! Standings computation: per-group tables with the configured tiebreaker
//! chain, bracket rankings from the seed-position table, and progressive
//! (monrad) level tracking.

use crate::logic::monrad;
use crate::models::{
    GameMatch, Group, GroupStandingRow, ParticipantId, Stage, Tiebreaker, Tournament,
    TournamentFormat,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRow {
    pub position: u32,
    pub participant_id: ParticipantId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveRow {
    pub position: u32,
    pub participant_id: ParticipantId,
    pub name: String,
    pub current_level: u32,
    pub trajectory: Trajectory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStandings {
    pub group_id: uuid::Uuid,
    pub name: String,
    pub standings: Vec<GroupStandingRow>,
}

/// Format-shaped standings view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Standings {
    Bracket {
        current_round: u32,
        total_rounds: u32,
        rankings: Vec<RankingRow>,
    },
    Groups {
        groups: Vec<GroupStandings>,
    },
    Pools {
        phase: String,
        groups: Vec<GroupStandings>,
        current_round: u32,
        total_rounds: u32,
        rankings: Vec<RankingRow>,
    },
    Progressive {
        current_round: u32,
        total_rounds: u32,
        standings: Vec<ProgressiveRow>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct StatLine {
    played: u32,
    wins: u32,
    losses: u32,
    games_won: u32,
    games_lost: u32,
    points_for: i64,
    points_against: i64,
    walkover_wins: u32,
}

impl StatLine {
    fn game_diff(&self) -> i64 {
        self.games_won as i64 - self.games_lost as i64
    }

    fn point_diff(&self) -> i64 {
        self.points_for - self.points_against
    }
}

/// Accumulate stat lines for `ids` from the terminal matches in `matches`.
fn accumulate(
    ids: &[ParticipantId],
    matches: &[&GameMatch],
) -> HashMap<ParticipantId, StatLine> {
    let mut stats: HashMap<ParticipantId, StatLine> =
        ids.iter().map(|id| (*id, StatLine::default())).collect();
    for m in matches {
        let result = match (&m.result, m.status.is_terminal()) {
            (Some(r), true) => r,
            _ => continue,
        };
        let a = m.participant_a.participant_id();
        for pid in [result.winner_id, result.loser_id] {
            let line = match stats.get_mut(&pid) {
                Some(l) => l,
                None => continue,
            };
            let won = pid == result.winner_id;
            line.played += 1;
            if won {
                line.wins += 1;
                if result.walkover {
                    line.walkover_wins += 1;
                }
            } else {
                line.losses += 1;
            }
            let is_side_a = a == Some(pid);
            for g in &result.game_scores {
                let (own, opp) = if is_side_a {
                    (g.player1, g.player2)
                } else {
                    (g.player2, g.player1)
                };
                if own > opp {
                    line.games_won += 1;
                } else {
                    line.games_lost += 1;
                }
                line.points_for += own as i64;
                line.points_against += opp as i64;
            }
        }
    }
    stats
}

/// Order participants by the configured tiebreaker chain, refining tied
/// subsets one criterion at a time. Participants still tied after the whole
/// chain fall back to seed order.
fn order_chain(
    t: &Tournament,
    ids: Vec<ParticipantId>,
    chain: &[Tiebreaker],
    stats: &HashMap<ParticipantId, StatLine>,
    matches: &[&GameMatch],
) -> Vec<ParticipantId> {
    if ids.len() <= 1 {
        return ids;
    }
    let Some((tb, rest)) = chain.split_first() else {
        let mut ids = ids;
        ids.sort_by_key(|id| t.participant(*id).map_or(u32::MAX, |p| p.seed));
        return ids;
    };

    // Lower key ranks higher.
    let keys: HashMap<ParticipantId, i64> = match tb {
        Tiebreaker::Wins => ids
            .iter()
            .map(|id| (*id, -(stats[id].wins as i64)))
            .collect(),
        Tiebreaker::GameDiff => ids.iter().map(|id| (*id, -stats[id].game_diff())).collect(),
        Tiebreaker::PointDiff => ids.iter().map(|id| (*id, -stats[id].point_diff())).collect(),
        Tiebreaker::FewestWalkovers => ids
            .iter()
            .map(|id| (*id, stats[id].walkover_wins as i64))
            .collect(),
        Tiebreaker::H2h => {
            // Wins counted only in matches between the tied participants.
            // With no mutual matches every key is zero and the criterion
            // passes through to the next one.
            let mutual: Vec<&GameMatch> = matches
                .iter()
                .filter(|m| {
                    let a = m.participant_a.participant_id();
                    let b = m.participant_b.participant_id();
                    matches!((a, b), (Some(a), Some(b)) if ids.contains(&a) && ids.contains(&b))
                })
                .copied()
                .collect();
            let mutual_stats = accumulate(&ids, &mutual);
            ids.iter()
                .map(|id| (*id, -(mutual_stats[id].wins as i64)))
                .collect()
        }
        Tiebreaker::Random => {
            let mut rng = rand::rngs::StdRng::seed_from_u64(t.id.as_u128() as u64);
            let mut shuffled = ids.clone();
            shuffled.sort_by_key(|id| t.participant(*id).map_or(u32::MAX, |p| p.seed));
            shuffled.shuffle(&mut rng);
            ids.iter()
                .map(|id| {
                    let at = shuffled.iter().position(|s| s == id).unwrap_or(0);
                    (*id, at as i64)
                })
                .collect()
        }
    };

    let mut ordered = ids;
    ordered.sort_by_key(|id| keys[id]);

    let mut out = Vec::with_capacity(ordered.len());
    let mut i = 0;
    while i < ordered.len() {
        let mut j = i + 1;
        while j < ordered.len() && keys[&ordered[j]] == keys[&ordered[i]] {
            j += 1;
        }
        out.extend(order_chain(t, ordered[i..j].to_vec(), rest, stats, matches));
        i = j;
    }
    out
}

/// Finishing order of a group's participants, best first.
pub(crate) fn rank_group_participants(t: &Tournament, group: &Group) -> Vec<ParticipantId> {
    let group_matches: Vec<&GameMatch> = group
        .match_ids
        .iter()
        .filter_map(|id| t.get_match(*id))
        .collect();
    let stats = accumulate(&group.participant_ids, &group_matches);
    order_chain(
        t,
        group.participant_ids.clone(),
        &t.config.tiebreakers,
        &stats,
        &group_matches,
    )
}

fn group_table(t: &Tournament, group: &Group, advance: Option<usize>) -> GroupStandings {
    let group_matches: Vec<&GameMatch> = group
        .match_ids
        .iter()
        .filter_map(|id| t.get_match(*id))
        .collect();
    let stats = accumulate(&group.participant_ids, &group_matches);
    let order = rank_group_participants(t, group);
    let standings = order
        .iter()
        .enumerate()
        .map(|(i, pid)| {
            let line = stats.get(pid).copied().unwrap_or_default();
            GroupStandingRow {
                participant_id: *pid,
                name: t.participant(*pid).map_or_else(String::new, |p| p.name.clone()),
                played: line.played,
                wins: line.wins,
                losses: line.losses,
                game_differential: line.game_diff() as i32,
                point_differential: line.point_diff() as i32,
                position: i as u32 + 1,
                qualified: advance.map_or(false, |a| i < a),
            }
        })
        .collect();
    GroupStandings {
        group_id: group.id,
        name: group.name.clone(),
        standings,
    }
}

fn bracket_rounds(t: &Tournament) -> (u32, u32) {
    let bracket: Vec<&GameMatch> = t
        .matches
        .iter()
        .filter(|m| m.stage != Some(Stage::Group))
        .collect();
    let total = bracket.iter().map(|m| m.round).max().unwrap_or(0);
    let current = bracket
        .iter()
        .filter(|m| !m.status.is_terminal())
        .map(|m| m.round)
        .min()
        .unwrap_or(total);
    (current, total)
}

/// Rankings from the seed-position table, byes skipped.
fn rankings_from_state(t: &Tournament) -> Vec<RankingRow> {
    t.state
        .seed_positions
        .iter()
        .filter_map(|(pos, slot)| {
            let pid = slot.participant_id()?;
            Some(RankingRow {
                position: *pos,
                participant_id: pid,
                name: t.participant(pid).map_or_else(String::new, |p| p.name.clone()),
            })
        })
        .collect()
}

/// Position table as it stood before `round` was played. Used to derive
/// progressive trajectories.
fn positions_before_round(t: &Tournament, round: u32) -> BTreeMap<u32, ParticipantId> {
    let mut positions = BTreeMap::new();
    let mut bracket: Vec<&GameMatch> = t
        .matches
        .iter()
        .filter(|m| m.position_a.is_some() && m.position_b.is_some() && m.round < round)
        .collect();
    bracket.sort_by_key(|m| (m.round, m.match_number));
    for m in bracket {
        let (pos_a, pos_b) = match (m.position_a, m.position_b) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        if let Some(pid) = m.participant_a.participant_id() {
            positions.insert(pos_a, pid);
        }
        if let Some(pid) = m.participant_b.participant_id() {
            positions.insert(pos_b, pid);
        }
        if let (Some(w), Some(l)) = (m.winner_ref(), m.loser_ref()) {
            let lo = pos_a.min(pos_b);
            let hi = pos_a.max(pos_b);
            if let Some(pid) = w.participant_id() {
                positions.insert(lo, pid);
            }
            match l.participant_id() {
                Some(pid) => {
                    positions.insert(hi, pid);
                }
                None => {
                    positions.remove(&hi);
                }
            }
        }
    }
    positions
}

fn progressive_rows(t: &Tournament, current_round: u32) -> Vec<ProgressiveRow> {
    let bs = t.state.bracket_size.max(2) as usize;
    let previous = positions_before_round(t, current_round);
    let prev_of: HashMap<ParticipantId, u32> =
        previous.iter().map(|(pos, pid)| (*pid, *pos)).collect();
    t.state
        .seed_positions
        .iter()
        .filter_map(|(pos, slot)| {
            let pid = slot.participant_id()?;
            let trajectory = match prev_of.get(&pid) {
                Some(prev) if *pos < *prev => Trajectory::Up,
                Some(prev) if *pos > *prev => Trajectory::Down,
                _ => Trajectory::Stable,
            };
            Some(ProgressiveRow {
                position: *pos,
                participant_id: pid,
                name: t.participant(pid).map_or_else(String::new, |p| p.name.clone()),
                current_level: monrad::level_of(bs, current_round, *pos),
                trajectory,
            })
        })
        .collect()
}

/// Standings view for the tournament, shaped by its format.
pub fn compute_standings(t: &Tournament) -> Standings {
    match t.format {
        TournamentFormat::SingleElimination => {
            let (current_round, total_rounds) = bracket_rounds(t);
            Standings::Bracket {
                current_round,
                total_rounds,
                rankings: rankings_from_state(t),
            }
        }
        TournamentFormat::RoundRobin => Standings::Groups {
            groups: t.groups.iter().map(|g| group_table(t, g, None)).collect(),
        },
        TournamentFormat::Monrad => {
            let (current_round, total_rounds) = bracket_rounds(t);
            Standings::Progressive {
                current_round,
                total_rounds,
                standings: progressive_rows(t, current_round),
            }
        }
        TournamentFormat::PoolsKnockout => {
            let advance = super::topology::effective_groups_config(t).advance_per_group;
            let groups: Vec<GroupStandings> = t
                .groups
                .iter()
                .map(|g| group_table(t, g, Some(advance)))
                .collect();
            let group_phase_done = t
                .matches
                .iter()
                .filter(|m| m.stage == Some(Stage::Group))
                .all(|m| m.status.is_terminal());
            let (current_round, total_rounds) = knockout_rounds_span(t);
            Standings::Pools {
                phase: if group_phase_done { "knockout" } else { "groups" }.to_string(),
                groups,
                current_round,
                total_rounds,
                rankings: if group_phase_done {
                    rankings_from_state(t)
                } else {
                    Vec::new()
                },
            }
        }
    }
}

fn knockout_rounds_span(t: &Tournament) -> (u32, u32) {
    let knockout: Vec<&GameMatch> = t
        .matches
        .iter()
        .filter(|m| m.stage == Some(Stage::Knockout))
        .collect();
    let total = knockout.iter().map(|m| m.round).max().unwrap_or(0);
    let current = knockout
        .iter()
        .filter(|m| !m.status.is_terminal())
        .map(|m| m.round)
        .min()
        .unwrap_or(total);
    (current, total)
}
