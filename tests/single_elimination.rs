//! Integration tests for single elimination: bracket shape, bye advancement,
//! result validation, and final rankings.

use squash_tournament_web::{
    apply_match_result, compute_standings, create_tournament, playable_matches, GameMatch,
    GameScore, KnockoutConfig, MatchId, MatchResult, MatchStatus, NewParticipant, ParticipantId,
    Stage, Standings, Tournament, TournamentConfig, TournamentError, TournamentFormat,
    TournamentStatus,
};
use uuid::Uuid;

fn entries(n: usize) -> Vec<NewParticipant> {
    (1..=n)
        .map(|i| NewParticipant {
            name: format!("P{i}"),
            seed: Some(i as u32),
            club: None,
            color: None,
        })
        .collect()
}

fn single_elim(n: usize) -> Tournament {
    create_tournament(
        "Club Open",
        TournamentFormat::SingleElimination,
        entries(n),
        TournamentConfig::default(),
    )
    .unwrap()
}

fn seed_of(t: &Tournament, id: ParticipantId) -> u32 {
    t.participant(id).unwrap().seed
}

/// Record a straight-games win. Returns the tournament-complete flag.
fn beat(t: &mut Tournament, match_id: MatchId, winner: ParticipantId) -> bool {
    let m = t.get_match(match_id).unwrap();
    let a = m.participant_a.participant_id().unwrap();
    let b = m.participant_b.participant_id().unwrap();
    let loser = if winner == a { b } else { a };
    let game = if winner == a {
        GameScore { player1: 15, player2: 10 }
    } else {
        GameScore { player1: 10, player2: 15 }
    };
    apply_match_result(
        t,
        match_id,
        MatchResult {
            winner_id: winner,
            loser_id: loser,
            game_scores: vec![game; 3],
            walkover: false,
            retired: false,
        },
    )
    .unwrap()
}

/// Play every ready match with the lower seed winning, until nothing is left.
fn play_out_lower_seed_wins(t: &mut Tournament) {
    loop {
        let ready: Vec<MatchId> = playable_matches(t).iter().map(|m| m.id).collect();
        if ready.is_empty() {
            break;
        }
        for id in ready {
            let m = t.get_match(id).unwrap();
            let a = m.participant_a.participant_id().unwrap();
            let b = m.participant_b.participant_id().unwrap();
            let winner = if seed_of(t, a) < seed_of(t, b) { a } else { b };
            beat(t, id, winner);
        }
    }
}

#[test]
fn four_player_bracket_shape() {
    let t = single_elim(4);
    assert_eq!(t.status, TournamentStatus::Active);
    assert_eq!(t.matches.len(), 3);

    let round1: Vec<_> = t.matches.iter().filter(|m| m.round == 1).collect();
    assert_eq!(round1.len(), 2);
    // Seed 1 faces seed 4, seed 2 faces seed 3.
    let m1 = round1.iter().find(|m| m.match_number == 1).unwrap();
    assert_eq!(seed_of(&t, m1.participant_a.participant_id().unwrap()), 1);
    assert_eq!(seed_of(&t, m1.participant_b.participant_id().unwrap()), 4);
    let m2 = round1.iter().find(|m| m.match_number == 2).unwrap();
    assert_eq!(seed_of(&t, m2.participant_a.participant_id().unwrap()), 2);
    assert_eq!(seed_of(&t, m2.participant_b.participant_id().unwrap()), 3);

    // Both round-1 matches are immediately playable, the final is not.
    assert_eq!(playable_matches(&t).len(), 2);
    let final_match = t.matches.iter().find(|m| m.round == 2).unwrap();
    assert_eq!(final_match.status, MatchStatus::Pending);
}

#[test]
fn four_player_upset_rankings() {
    let mut t = single_elim(4);
    let by_seed = |t: &Tournament, s: u32| t.participant_by_seed(s).unwrap().id;

    let round1: Vec<MatchId> = t
        .matches
        .iter()
        .filter(|m| m.round == 1)
        .map(|m| m.id)
        .collect();
    // Seed 1 holds, seed 3 upsets seed 2.
    let w = by_seed(&t, 1);
    assert!(!beat(&mut t, round1[0], w));
    let w = by_seed(&t, 3);
    assert!(!beat(&mut t, round1[1], w));

    let final_id = t.matches.iter().find(|m| m.round == 2).unwrap().id;
    let f = t.get_match(final_id).unwrap();
    assert_eq!(seed_of(&t, f.participant_a.participant_id().unwrap()), 1);
    assert_eq!(seed_of(&t, f.participant_b.participant_id().unwrap()), 3);

    let champion = by_seed(&t, 1);
    let complete = beat(&mut t, final_id, champion);
    assert!(complete);
    assert_eq!(t.status, TournamentStatus::Completed);

    match compute_standings(&t) {
        Standings::Bracket { rankings, total_rounds, .. } => {
            assert_eq!(total_rounds, 2);
            let order: Vec<u32> = rankings.iter().map(|r| seed_of(&t, r.participant_id)).collect();
            // Champion, runner-up, then the beaten semifinalists by position.
            assert_eq!(order, vec![1, 3, 2, 4]);
        }
        other => panic!("expected bracket standings, got {:?}", other),
    }
}

#[test]
fn five_player_byes_advance_top_seeds() {
    let t = single_elim(5);
    // 8-slot draw: 4 round-1 matches, 3 of them byes that complete on creation.
    let round1: Vec<_> = t.matches.iter().filter(|m| m.round == 1).collect();
    assert_eq!(round1.len(), 4);
    let auto = round1
        .iter()
        .filter(|m| m.status == MatchStatus::Completed && m.result.is_none())
        .count();
    assert_eq!(auto, 3);

    // The 4-vs-5 match wants playing, and the bye cascade has already fed
    // seeds 2 and 3 into their semifinal, so that is ready too.
    let playable = playable_matches(&t);
    assert_eq!(playable.len(), 2);
    let pairing = |m: &GameMatch| {
        let mut seeds = [
            seed_of(&t, m.participant_a.participant_id().unwrap()),
            seed_of(&t, m.participant_b.participant_id().unwrap()),
        ];
        seeds.sort();
        seeds
    };
    let mut pairings: Vec<_> = playable.iter().map(|m| pairing(m)).collect();
    pairings.sort();
    assert_eq!(pairings, vec![[2, 3], [4, 5]]);

    // Seed 1 is already waiting in its semifinal slot.
    let semi1 = t
        .matches
        .iter()
        .find(|m| m.round == 2 && m.match_number == 1)
        .unwrap();
    assert_eq!(seed_of(&t, semi1.participant_a.participant_id().unwrap()), 1);
}

#[test]
fn resubmitting_after_the_tournament_completes_reports_the_match_done() {
    let mut t = single_elim(2);
    let by_seed = |t: &Tournament, s: u32| t.participant_by_seed(s).unwrap().id;
    let final_id = t.matches[0].id;
    let winner = by_seed(&t, 1);
    let loser = by_seed(&t, 2);
    assert!(beat(&mut t, final_id, winner));
    assert_eq!(t.status, TournamentStatus::Completed);

    // A second submission against the decided match is the match's problem,
    // not the tournament's.
    let err = apply_match_result(
        &mut t,
        final_id,
        MatchResult {
            winner_id: loser,
            loser_id: winner,
            game_scores: vec![GameScore { player1: 15, player2: 10 }; 3],
            walkover: false,
            retired: false,
        },
    )
    .unwrap_err();
    assert!(matches!(err, TournamentError::AlreadyCompleted(id) if id == final_id));
}

#[test]
fn result_validation_errors() {
    let mut t = single_elim(4);
    let by_seed = |t: &Tournament, s: u32| t.participant_by_seed(s).unwrap().id;
    let round1: Vec<MatchId> = t
        .matches
        .iter()
        .filter(|m| m.round == 1)
        .map(|m| m.id)
        .collect();
    let final_id = t.matches.iter().find(|m| m.round == 2).unwrap().id;

    let win_1_over_4 = MatchResult {
        winner_id: by_seed(&t, 1),
        loser_id: by_seed(&t, 4),
        game_scores: vec![GameScore { player1: 15, player2: 10 }; 3],
        walkover: false,
        retired: false,
    };

    // Unknown match id.
    assert!(matches!(
        apply_match_result(&mut t, Uuid::new_v4(), win_1_over_4.clone()),
        Err(TournamentError::MatchNotFound(_))
    ));
    // The final has no resolved participants yet.
    assert!(matches!(
        apply_match_result(&mut t, final_id, win_1_over_4.clone()),
        Err(TournamentError::NotReady(_))
    ));
    // Wrong pairing: seeds 1 and 4 are not in match 2.
    assert!(matches!(
        apply_match_result(&mut t, round1[1], win_1_over_4.clone()),
        Err(TournamentError::InvalidInput(_))
    ));
    // Drawn games are impossible.
    let drawn = MatchResult {
        game_scores: vec![GameScore { player1: 15, player2: 15 }],
        ..win_1_over_4.clone()
    };
    assert!(matches!(
        apply_match_result(&mut t, round1[0], drawn),
        Err(TournamentError::InvalidInput(_))
    ));
    // A valid result sticks; a second submission is rejected.
    apply_match_result(&mut t, round1[0], win_1_over_4.clone()).unwrap();
    assert!(matches!(
        apply_match_result(&mut t, round1[0], win_1_over_4),
        Err(TournamentError::AlreadyCompleted(_))
    ));
}

#[test]
fn walkover_requires_permission_and_empty_scores() {
    let mut t = single_elim(4);
    let by_seed = |t: &Tournament, s: u32| t.participant_by_seed(s).unwrap().id;
    let m1 = t
        .matches
        .iter()
        .find(|m| m.round == 1 && m.match_number == 1)
        .unwrap()
        .id;

    let walkover = MatchResult {
        winner_id: by_seed(&t, 1),
        loser_id: by_seed(&t, 4),
        game_scores: Vec::new(),
        walkover: true,
        retired: false,
    };
    // Scores on a walkover are rejected.
    let with_scores = MatchResult {
        game_scores: vec![GameScore { player1: 15, player2: 0 }],
        ..walkover.clone()
    };
    assert!(matches!(
        apply_match_result(&mut t, m1, with_scores),
        Err(TournamentError::InvalidInput(_))
    ));
    apply_match_result(&mut t, m1, walkover).unwrap();
    assert_eq!(t.get_match(m1).unwrap().status, MatchStatus::Walkover);

    // With walkovers disabled, creation-time config blocks them.
    let config = TournamentConfig {
        allow_walkovers: false,
        ..TournamentConfig::default()
    };
    let mut t2 = create_tournament(
        "No Walkovers",
        TournamentFormat::SingleElimination,
        entries(4),
        config,
    )
    .unwrap();
    let m = t2
        .matches
        .iter()
        .find(|m| m.round == 1 && m.match_number == 1)
        .unwrap()
        .id;
    let wo = MatchResult {
        winner_id: t2.participant_by_seed(1).unwrap().id,
        loser_id: t2.participant_by_seed(4).unwrap().id,
        game_scores: Vec::new(),
        walkover: true,
        retired: false,
    };
    assert!(matches!(
        apply_match_result(&mut t2, m, wo),
        Err(TournamentError::InvalidInput(_))
    ));
}

#[test]
fn consolation_bracket_ranks_the_bottom_half() {
    let config = TournamentConfig {
        knockout: Some(KnockoutConfig {
            consolation: true,
            draw_size: None,
        }),
        ..TournamentConfig::default()
    };
    let mut t = create_tournament(
        "Consolation Open",
        TournamentFormat::SingleElimination,
        entries(8),
        config,
    )
    .unwrap();

    // 7 main-draw matches plus a 3-match mirror for the round-1 losers.
    assert_eq!(t.matches.len(), 10);
    let consolation = t
        .matches
        .iter()
        .filter(|m| m.stage == Some(Stage::Consolation))
        .count();
    assert_eq!(consolation, 3);

    play_out_lower_seed_wins(&mut t);
    assert_eq!(t.status, TournamentStatus::Completed);

    match compute_standings(&t) {
        Standings::Bracket { rankings, .. } => {
            let order: Vec<u32> = rankings.iter().map(|r| seed_of(&t, r.participant_id)).collect();
            // With no upsets every seed finishes at its own position,
            // including 5 through 8 via the consolation rounds.
            assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        }
        other => panic!("expected bracket standings, got {:?}", other),
    }
}

#[test]
fn results_resolve_in_any_submission_order() {
    let mut t = single_elim(8);
    let by_seed = |t: &Tournament, s: u32| t.participant_by_seed(s).unwrap().id;

    // Submit round 1 out of order; each semifinal becomes ready exactly when
    // both of its feeders are decided.
    let round1: Vec<MatchId> = t
        .matches
        .iter()
        .filter(|m| m.round == 1)
        .map(|m| m.id)
        .collect();
    let w = by_seed(&t, 2);
    beat(&mut t, round1[2], w);
    let w = by_seed(&t, 1);
    beat(&mut t, round1[0], w);
    assert_eq!(playable_matches(&t).len(), 2);
    let w = by_seed(&t, 3);
    beat(&mut t, round1[3], w);
    let w = by_seed(&t, 4);
    beat(&mut t, round1[1], w);

    let semis: Vec<_> = t
        .matches
        .iter()
        .filter(|m| m.round == 2 && m.status == MatchStatus::Ready)
        .collect();
    assert_eq!(semis.len(), 2);

    play_out_lower_seed_wins(&mut t);
    assert_eq!(t.status, TournamentStatus::Completed);
}
