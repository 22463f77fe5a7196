//! Bracket topology: turns participants + format + config into the full
//! round/match graph, with placeholder slots wired to their source matches.

use crate::logic::{monrad, resolver, seeding};
use crate::models::{
    GameMatch, Group, GroupsConfig, Participant, ParticipantRef, SourceRole, Stage, Tournament,
    TournamentConfig, TournamentError, TournamentFormat,
};
use std::collections::{HashMap, HashSet};

/// Participant as submitted at tournament creation. Seeds are optional: when
/// none are given, entry order decides (first entry = seed 1).
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NewParticipant {
    pub name: String,
    pub seed: Option<u32>,
    pub club: Option<String>,
    pub color: Option<String>,
}

/// Create and activate a tournament: validates input, builds the topology for
/// the chosen format, auto-resolves byes, and seeds the position table.
pub fn create_tournament(
    name: &str,
    format: TournamentFormat,
    entries: Vec<NewParticipant>,
    config: TournamentConfig,
) -> Result<Tournament, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidInput(
            "tournament name is required".to_string(),
        ));
    }
    config.validate()?;
    if entries.len() < 2 {
        return Err(TournamentError::InsufficientParticipants {
            required: 2,
            actual: entries.len(),
        });
    }
    let participants = assign_seeds(entries)?;

    let mut tournament = Tournament::new(name, format, participants, config);
    build_topology(&mut tournament)?;
    tournament.activate()?;
    Ok(tournament)
}

/// Validate names and resolve seeds into a permutation of 1..=n.
fn assign_seeds(entries: Vec<NewParticipant>) -> Result<Vec<Participant>, TournamentError> {
    let n = entries.len();
    let mut seen_names: HashSet<String> = HashSet::new();
    for e in &entries {
        let trimmed = e.name.trim();
        if trimmed.is_empty() {
            return Err(TournamentError::InvalidInput(
                "participant name must not be empty".to_string(),
            ));
        }
        if !seen_names.insert(trimmed.to_lowercase()) {
            return Err(TournamentError::DuplicateParticipantName(
                trimmed.to_string(),
            ));
        }
    }

    // Any explicit seed, even an invalid one, opts the field into seeded
    // entry so that out-of-range values get rejected below.
    let any_seeded = entries.iter().any(|e| e.seed.is_some());
    let mut participants = Vec::with_capacity(n);
    let mut seen_seeds: HashSet<u32> = HashSet::new();
    for (idx, e) in entries.into_iter().enumerate() {
        let seed = if any_seeded {
            match e.seed {
                Some(s) if s >= 1 && s as usize <= n => s,
                other => {
                    return Err(TournamentError::InvalidInput(format!(
                        "seed {:?} out of range 1..={}",
                        other, n
                    )))
                }
            }
        } else {
            idx as u32 + 1
        };
        if !seen_seeds.insert(seed) {
            return Err(TournamentError::InvalidInput(format!(
                "duplicate seed {}",
                seed
            )));
        }
        let mut p = Participant::new(e.name.trim(), seed);
        p.club = e.club.filter(|c| !c.trim().is_empty());
        p.color = e.color;
        participants.push(p);
    }
    participants.sort_by_key(|p| p.seed);
    Ok(participants)
}

/// Build matches, groups, and the initial seed-position table for a draft
/// tournament. Dispatches exhaustively over the format.
pub fn build_topology(t: &mut Tournament) -> Result<(), TournamentError> {
    match t.format {
        TournamentFormat::SingleElimination => build_single_elimination(t)?,
        TournamentFormat::RoundRobin => build_round_robin(t)?,
        TournamentFormat::Monrad => build_monrad(t)?,
        TournamentFormat::PoolsKnockout => build_pools_knockout(t)?,
    }
    check_references(t)?;
    resolver::settle(t)?;
    t.state = resolver::rebuild_seed_state(t);
    Ok(())
}

/// Every seed-position placeholder must point at a match that exists.
fn check_references(t: &Tournament) -> Result<(), TournamentError> {
    let ids: HashSet<_> = t.matches.iter().map(|m| m.id).collect();
    let group_ids: HashSet<_> = t.groups.iter().map(|g| g.id).collect();
    for m in &t.matches {
        for slot in [&m.participant_a, &m.participant_b] {
            match slot {
                ParticipantRef::SeedPosition {
                    source_match_id, ..
                } if !ids.contains(source_match_id) => {
                    return Err(TournamentError::DanglingReference(format!(
                        "match R{}M{} references unknown match {}",
                        m.round, m.match_number, source_match_id
                    )));
                }
                ParticipantRef::GroupPosition { group_id, .. }
                    if !group_ids.contains(group_id) =>
                {
                    return Err(TournamentError::DanglingReference(format!(
                        "match R{}M{} references unknown group {}",
                        m.round, m.match_number, group_id
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Group-stage defaults differ per format when the config leaves them out:
/// round robin aims for one big group of up to 6, pools for groups of 4.
pub fn effective_groups_config(t: &Tournament) -> GroupsConfig {
    if let Some(g) = &t.config.groups {
        return g.clone();
    }
    match t.format {
        TournamentFormat::RoundRobin => GroupsConfig {
            target_size: t.participants.len().clamp(2, 6),
            advance_per_group: 2,
            avoid_same_club: false,
        },
        _ => GroupsConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Knockout brackets (single elimination, pools knockout phase)
// ---------------------------------------------------------------------------

/// Build a single-elimination bracket over `draw_size` slots (a power of two).
/// `entrant` maps a seed 1..=draw_size to its round-1 slot occupant. Later
/// rounds are wired with winner refs; with `consolation`, round-1 losers get a
/// mirror bracket. Slot positions carry the seed-position algebra: the winner
/// of a pair keeps its lower position, the loser its higher one.
fn build_knockout_matches(
    entrant: impl Fn(u32) -> ParticipantRef,
    draw_size: usize,
    stage: Option<Stage>,
    consolation: bool,
) -> Vec<GameMatch> {
    let slot_order = seeding::bracket_slot_order(draw_size);
    let rounds = seeding::knockout_rounds(draw_size);
    let mut matches: Vec<GameMatch> = Vec::new();

    // (match id, position the winner keeps, position the loser keeps)
    let mut prev_round: Vec<(uuid::Uuid, u32, u32)> = Vec::new();
    for j in 0..draw_size / 2 {
        let (pos_a, pos_b) = (slot_order[2 * j], slot_order[2 * j + 1]);
        let mut m = GameMatch::new(1, j as u32 + 1, entrant(pos_a), entrant(pos_b))
            .with_positions(pos_a, pos_b);
        m.stage = stage;
        prev_round.push((m.id, pos_a, pos_b));
        matches.push(m);
    }

    for round in 2..=rounds {
        let mut this_round = Vec::with_capacity(prev_round.len() / 2);
        for j in 0..prev_round.len() / 2 {
            let (src_a, win_a, _) = prev_round[2 * j];
            let (src_b, win_b, _) = prev_round[2 * j + 1];
            let slot_a = ParticipantRef::SeedPosition {
                seed: win_a,
                source_match_id: src_a,
                source_role: SourceRole::Winner,
            };
            let slot_b = ParticipantRef::SeedPosition {
                seed: win_b,
                source_match_id: src_b,
                source_role: SourceRole::Winner,
            };
            let (lo, hi) = (win_a.min(win_b), win_a.max(win_b));
            let mut m = GameMatch::new(round, j as u32 + 1, slot_a, slot_b).with_positions(lo, hi);
            m.stage = stage;
            this_round.push((m.id, lo, hi));
            matches.push(m);
        }
        prev_round = this_round;
    }

    if consolation && draw_size >= 4 {
        matches.extend(build_consolation_matches(&matches, draw_size));
    }
    matches
}

/// Mirror bracket for round-1 losers: adjacent round-1 matches feed the same
/// consolation match, and consolation winners chain upward like a normal
/// knockout. Positions live in the bottom half of the draw.
fn build_consolation_matches(main: &[GameMatch], draw_size: usize) -> Vec<GameMatch> {
    let rounds = seeding::knockout_rounds(draw_size);
    let mut matches: Vec<GameMatch> = Vec::new();

    let round_one: Vec<(uuid::Uuid, u32)> = main
        .iter()
        .filter(|m| m.round == 1)
        .map(|m| {
            let lose_pos = m.position_a.unwrap_or(0).max(m.position_b.unwrap_or(0));
            (m.id, lose_pos)
        })
        .collect();

    let mut prev: Vec<(uuid::Uuid, u32, SourceRole)> = round_one
        .into_iter()
        .map(|(id, pos)| (id, pos, SourceRole::Loser))
        .collect();

    for round in 2..=rounds {
        let mut this_round = Vec::with_capacity(prev.len() / 2);
        for j in 0..prev.len() / 2 {
            let (src_a, pos_a, role_a) = prev[2 * j];
            let (src_b, pos_b, role_b) = prev[2 * j + 1];
            let slot_a = ParticipantRef::SeedPosition {
                seed: pos_a,
                source_match_id: src_a,
                source_role: role_a,
            };
            let slot_b = ParticipantRef::SeedPosition {
                seed: pos_b,
                source_match_id: src_b,
                source_role: role_b,
            };
            let (lo, hi) = (pos_a.min(pos_b), pos_a.max(pos_b));
            let m = GameMatch::new(round, j as u32 + 1, slot_a, slot_b)
                .with_stage(Stage::Consolation)
                .with_positions(lo, hi);
            this_round.push((m.id, lo, SourceRole::Winner));
            matches.push(m);
        }
        prev = this_round;
    }
    matches
}

fn build_single_elimination(t: &mut Tournament) -> Result<(), TournamentError> {
    let n = t.participants.len();
    let knockout_cfg = t.config.knockout.clone().unwrap_or_default();
    let draw = knockout_cfg
        .draw_size
        .unwrap_or_else(|| seeding::next_power_of_two(n));
    if draw < n {
        return Err(TournamentError::InvalidInput(format!(
            "knockout.draw_size {} is smaller than the field of {}",
            draw, n
        )));
    }

    let by_seed: HashMap<u32, ParticipantRef> = t
        .participants
        .iter()
        .map(|p| (p.seed, ParticipantRef::participant(p.id)))
        .collect();
    let entrant = |seed: u32| -> ParticipantRef {
        by_seed.get(&seed).cloned().unwrap_or(ParticipantRef::Bye)
    };

    t.matches = build_knockout_matches(entrant, draw, None, knockout_cfg.consolation);
    t.state.bracket_size = draw as u32;
    Ok(())
}

// ---------------------------------------------------------------------------
// Monrad
// ---------------------------------------------------------------------------

fn build_monrad(t: &mut Tournament) -> Result<(), TournamentError> {
    let n = t.participants.len();
    let bs = seeding::next_power_of_two(n);
    let rounds = seeding::monrad_rounds(n);

    let by_seed: HashMap<u32, ParticipantRef> = t
        .participants
        .iter()
        .map(|p| (p.seed, ParticipantRef::participant(p.id)))
        .collect();
    let entrant = |seed: u32| -> ParticipantRef {
        by_seed.get(&seed).cloned().unwrap_or(ParticipantRef::Bye)
    };

    let mut matches: Vec<GameMatch> = Vec::new();
    // Ids of the previous round's matches, in pair order.
    let mut prev_round_ids: Vec<uuid::Uuid> = Vec::new();

    for round in 1..=rounds {
        let pairs = monrad::round_pairs(bs, round);
        let mut this_round_ids = Vec::with_capacity(pairs.len());
        for (j, &(a, b)) in pairs.iter().enumerate() {
            let slot_for = |pos: u32| -> Result<ParticipantRef, TournamentError> {
                if round == 1 {
                    return Ok(entrant(pos));
                }
                let (idx, role) = monrad::source_for_position(bs, round - 1, pos).ok_or_else(
                    || {
                        TournamentError::DanglingReference(format!(
                            "no round {} match decides position {}",
                            round - 1,
                            pos
                        ))
                    },
                )?;
                Ok(ParticipantRef::SeedPosition {
                    seed: pos,
                    source_match_id: prev_round_ids[idx],
                    source_role: role,
                })
            };
            let m = GameMatch::new(round, j as u32 + 1, slot_for(a)?, slot_for(b)?)
                .with_positions(a, b);
            this_round_ids.push(m.id);
            matches.push(m);
        }
        prev_round_ids = this_round_ids;
    }

    t.matches = matches;
    t.state.bracket_size = bs as u32;
    Ok(())
}

// ---------------------------------------------------------------------------
// Round robin groups and pools → knockout
// ---------------------------------------------------------------------------

/// Snake-distribute participants (sorted by seed) into groups, optionally
/// nudging same-club members apart, then schedule a full circle-method round
/// robin inside each group.
fn build_group_stage(
    t: &Tournament,
    cfg: &GroupsConfig,
) -> Result<(Vec<Group>, Vec<GameMatch>), TournamentError> {
    let mut sorted: Vec<&Participant> = t.participants.iter().collect();
    sorted.sort_by_key(|p| p.seed);
    let n = sorted.len();
    let num_groups = n.div_ceil(cfg.target_size);

    let mut buckets: Vec<Vec<&Participant>> = vec![Vec::new(); num_groups];
    for (idx, p) in sorted.into_iter().enumerate() {
        let row = idx / num_groups;
        let col = idx % num_groups;
        let g = if row % 2 == 0 { col } else { num_groups - 1 - col };
        buckets[g].push(p);
    }

    if cfg.avoid_same_club && num_groups > 1 {
        separate_clubs(&mut buckets);
    }

    let mut groups = Vec::with_capacity(num_groups);
    let mut matches: Vec<GameMatch> = Vec::new();
    let mut per_round_counter: HashMap<u32, u32> = HashMap::new();

    for (g_idx, members) in buckets.iter().enumerate() {
        let name = format!("Group {}", (b'A' + g_idx as u8) as char);
        let mut group = Group::new(name, members.iter().map(|p| p.id).collect());

        // Circle method: fix the first entry, rotate the rest each round.
        let mut ring: Vec<Option<&Participant>> = members.iter().map(|p| Some(*p)).collect();
        if ring.len() % 2 == 1 {
            ring.push(None);
        }
        let l = ring.len();
        for round in 1..=(l.saturating_sub(1)) as u32 {
            for i in 0..l / 2 {
                if let (Some(a), Some(b)) = (ring[i], ring[l - 1 - i]) {
                    let number = per_round_counter.entry(round).or_insert(0);
                    *number += 1;
                    let mut m = GameMatch::new(
                        round,
                        *number,
                        ParticipantRef::participant(a.id),
                        ParticipantRef::participant(b.id),
                    )
                    .with_stage(Stage::Group);
                    m.group_id = Some(group.id);
                    group.match_ids.push(m.id);
                    matches.push(m);
                }
            }
            if l > 2 {
                let last = ring.pop().ok_or(TournamentError::InvalidState)?;
                ring.insert(1, last);
            }
        }
        groups.push(group);
    }
    Ok((groups, matches))
}

/// Best-effort pass: when two group members share a club, try swapping one of
/// them with a different-club member of another group without creating a new
/// clash there. Purely deterministic; gives up where no swap helps.
fn separate_clubs(buckets: &mut [Vec<&Participant>]) {
    let clash = |members: &[&Participant], candidate: &Participant, skip: usize| -> bool {
        members.iter().enumerate().any(|(i, m)| {
            i != skip
                && m.club.is_some()
                && m.club == candidate.club
        })
    };
    for g in 0..buckets.len() {
        for i in 1..buckets[g].len() {
            let member = buckets[g][i];
            if member.club.is_none() || !clash(&buckets[g], member, i) {
                continue;
            }
            'search: for h in 0..buckets.len() {
                if h == g {
                    continue;
                }
                for j in 0..buckets[h].len() {
                    let other = buckets[h][j];
                    if !clash(&buckets[h], member, usize::MAX)
                        && !clash(&buckets[g], other, i)
                        && !clash(&buckets[h], member, j)
                    {
                        let tmp = buckets[g][i];
                        buckets[g][i] = buckets[h][j];
                        buckets[h][j] = tmp;
                        break 'search;
                    }
                }
            }
        }
    }
}

fn build_round_robin(t: &mut Tournament) -> Result<(), TournamentError> {
    let cfg = effective_groups_config(t);
    let (groups, matches) = build_group_stage(t, &cfg)?;
    t.groups = groups;
    t.matches = matches;
    t.state.bracket_size = 0;
    Ok(())
}

fn build_pools_knockout(t: &mut Tournament) -> Result<(), TournamentError> {
    let cfg = effective_groups_config(t);
    let (groups, mut matches) = build_group_stage(t, &cfg)?;

    let num_groups = groups.len();
    let qualifiers = num_groups * cfg.advance_per_group;
    if qualifiers < 2 {
        return Err(TournamentError::InvalidInput(
            "pools_knockout needs at least 2 qualifiers".to_string(),
        ));
    }
    let knockout_cfg = t.config.knockout.clone().unwrap_or_default();
    let draw = knockout_cfg
        .draw_size
        .unwrap_or_else(|| seeding::next_power_of_two(qualifiers));
    if draw < qualifiers {
        return Err(TournamentError::InvalidInput(format!(
            "knockout.draw_size {} is smaller than {} qualifiers",
            draw, qualifiers
        )));
    }

    // Knockout seed s maps to the finisher at position ceil(s / groups) of
    // group (s-1) % groups: group winners first, then runners-up, spread so
    // same-group qualifiers land in opposite halves.
    let entrant = |seed: u32| -> ParticipantRef {
        let s = seed as usize;
        if s > qualifiers {
            return ParticipantRef::Bye;
        }
        let position = (s - 1) / num_groups + 1;
        let group_idx = (s - 1) % num_groups;
        ParticipantRef::GroupPosition {
            group_id: groups[group_idx].id,
            position: position as u32,
        }
    };

    matches.extend(build_knockout_matches(
        entrant,
        draw,
        Some(Stage::Knockout),
        knockout_cfg.consolation,
    ));
    t.groups = groups;
    t.matches = matches;
    t.state.bracket_size = draw as u32;
    Ok(())
}
