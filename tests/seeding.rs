//! Tests for the seeding tables: slot order, byes, round counts.

use squash_tournament_web::logic::seeding::{
    bracket_slot_order, bye_count, generate_seed_order, knockout_rounds, monrad_rounds,
    next_power_of_two,
};
use squash_tournament_web::TournamentError;

#[test]
fn slot_order_small_draws() {
    assert_eq!(bracket_slot_order(2), vec![1, 2]);
    assert_eq!(bracket_slot_order(4), vec![1, 4, 2, 3]);
    assert_eq!(bracket_slot_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    assert_eq!(
        bracket_slot_order(16),
        vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
    );
}

#[test]
fn slot_order_pairs_sum_to_size_plus_one() {
    for bs in [2, 4, 8, 16, 32, 64, 128] {
        let order = bracket_slot_order(bs);
        for pair in order.chunks(2) {
            assert_eq!(pair[0] + pair[1], bs as u32 + 1, "draw size {}", bs);
        }
    }
}

#[test]
fn top_two_seeds_land_in_opposite_halves() {
    for bs in [4, 8, 16, 32, 64] {
        let order = bracket_slot_order(bs);
        let idx1 = order.iter().position(|&s| s == 1).unwrap();
        let idx2 = order.iter().position(|&s| s == 2).unwrap();
        assert!(idx1 < bs / 2, "seed 1 must sit in the top half of a {} draw", bs);
        assert!(idx2 >= bs / 2, "seed 2 must sit in the bottom half of a {} draw", bs);
    }
}

#[test]
fn seed_order_is_a_permutation_for_any_field_size() {
    for n in 2..=64 {
        let mut order = generate_seed_order(n).unwrap();
        assert_eq!(order.len(), n);
        order.sort_unstable();
        let expected: Vec<u32> = (1..=n as u32).collect();
        assert_eq!(order, expected, "field of {}", n);
    }
}

#[test]
fn seed_order_rejects_tiny_fields() {
    assert!(matches!(
        generate_seed_order(0),
        Err(TournamentError::InvalidInput(_))
    ));
    assert!(matches!(
        generate_seed_order(1),
        Err(TournamentError::InvalidInput(_))
    ));
}

#[test]
fn bye_counts() {
    assert_eq!(bye_count(2), 0);
    assert_eq!(bye_count(5), 3);
    assert_eq!(bye_count(8), 0);
    assert_eq!(bye_count(9), 7);
    assert_eq!(bye_count(17), 15);
}

#[test]
fn round_counts() {
    assert_eq!(next_power_of_two(5), 8);
    assert_eq!(knockout_rounds(2), 1);
    assert_eq!(knockout_rounds(4), 2);
    assert_eq!(knockout_rounds(5), 3);
    assert_eq!(knockout_rounds(8), 3);
    assert_eq!(knockout_rounds(9), 4);
    assert_eq!(knockout_rounds(16), 4);
    // Monrad plays at least 3 rounds even in a tiny field.
    assert_eq!(monrad_rounds(4), 3);
    assert_eq!(monrad_rounds(5), 3);
    assert_eq!(monrad_rounds(8), 3);
    assert_eq!(monrad_rounds(16), 4);
    assert_eq!(monrad_rounds(32), 5);
}
