//! Monrad (progressive consolation) pairing arithmetic.
//!
//! The whole field occupies positions 1..=bracket_size. Each round partitions
//! the positions into contiguous blocks (halving in size every round, floor 2)
//! and pairs each block by bisection: (p, p+m-1), (p+1, p+m-2), ... After a
//! match over pair (a, b) with a < b, the winner takes position a and the
//! loser position b, so winners meet same-path winners and losers meet
//! same-path losers in the next round's smaller blocks.

use crate::models::SourceRole;

/// Size of each pairing block in a given round (1-based). Once blocks reach
/// size 2 they stay there, so extra rounds (n below 8 still plays 3) re-pair
/// adjacent positions.
pub fn block_size(bracket_size: usize, round: u32) -> usize {
    let shifted = bracket_size >> (round - 1).min(31);
    shifted.max(2)
}

/// Position pairs played in a round, in match order: block by block, outermost
/// pair first. Round 1 of an 8-draw is (1,8),(2,7),(3,6),(4,5).
pub fn round_pairs(bracket_size: usize, round: u32) -> Vec<(u32, u32)> {
    let m = block_size(bracket_size, round);
    let mut pairs = Vec::with_capacity(bracket_size / 2);
    let mut base = 0usize;
    while base < bracket_size {
        for i in 0..m / 2 {
            pairs.push(((base + i + 1) as u32, (base + m - i) as u32));
        }
        base += m;
    }
    pairs
}

/// Which round-`round` match decides the occupant of `position` afterwards:
/// index of the pair containing the position, plus the role (winner keeps the
/// lower position of its pair, loser the higher).
pub fn source_for_position(
    bracket_size: usize,
    round: u32,
    position: u32,
) -> Option<(usize, SourceRole)> {
    for (idx, &(a, b)) in round_pairs(bracket_size, round).iter().enumerate() {
        if a == position {
            return Some((idx, SourceRole::Winner));
        }
        if b == position {
            return Some((idx, SourceRole::Loser));
        }
    }
    None
}

/// 1-based index of the block a position sits in during a round; this is the
/// "level" shown in progressive standings (level 1 = championship bracket).
pub fn level_of(bracket_size: usize, round: u32, position: u32) -> u32 {
    let m = block_size(bracket_size, round) as u32;
    (position - 1) / m + 1
}
