//! Tournament business logic: seeding, bracket topology, match resolution,
//! standings.

pub mod monrad;
pub mod resolver;
pub mod seeding;
pub mod standings;
mod topology;

pub use resolver::{apply_match_result, playable_matches, start_match};
pub use standings::{compute_standings, GroupStandings, ProgressiveRow, RankingRow, Standings, Trajectory};
pub use topology::{create_tournament, NewParticipant};
