//! Seeding tables: canonical bisection seed order, byes, round counts.

use crate::models::TournamentError;

/// Smallest power of two >= n. Bracket position spaces are always this size.
pub fn next_power_of_two(n: usize) -> usize {
    n.next_power_of_two()
}

/// Number of round-1 byes for an n-entrant knockout draw. Byes fall to the
/// top seeds: seed k's round-1 opponent is `bracket_size + 1 - k`, so seeds
/// 1..=byes face empty slots.
pub fn bye_count(n: usize) -> usize {
    next_power_of_two(n) - n
}

/// Rounds in a single-elimination draw: ceil(log2(n)).
pub fn knockout_rounds(n: usize) -> u32 {
    next_power_of_two(n).trailing_zeros()
}

/// Rounds in a Monrad draw: at least 3, otherwise ceil(log2(n)).
pub fn monrad_rounds(n: usize) -> u32 {
    knockout_rounds(n).max(3)
}

/// Full-bracket slot order for a power-of-two draw, built by recursive
/// bisection: [1] -> [1,2] -> [1,4,2,3] -> [1,8,4,5,2,7,3,6] -> ...
/// Consecutive pairs are round-1 matches; adjacent matches feed the same
/// round-2 match, so seeds 1 and 2 can only meet in the final.
pub fn bracket_slot_order(bracket_size: usize) -> Vec<u32> {
    debug_assert!(bracket_size.is_power_of_two());
    let mut order = vec![1u32];
    let mut size = 1;
    while size < bracket_size {
        size *= 2;
        let mut next = Vec::with_capacity(size);
        for &s in &order {
            next.push(s);
            next.push(size as u32 + 1 - s);
        }
        order = next;
    }
    order
}

/// Round-1 pairing order over seeds 1..=n: the bracket slot order for the
/// enclosing power-of-two draw, with bye slots (seeds above n) dropped.
/// Always a permutation of 1..=n.
pub fn generate_seed_order(n: usize) -> Result<Vec<u32>, TournamentError> {
    if n < 2 {
        return Err(TournamentError::InvalidInput(format!(
            "seed order requires at least 2 participants (got {})",
            n
        )));
    }
    let order = bracket_slot_order(next_power_of_two(n));
    Ok(order.into_iter().filter(|&s| s as usize <= n).collect())
}
