//! Squash tournament organizer: library with models and bracket logic.

pub mod logic;
pub mod models;

pub use logic::{
    apply_match_result, compute_standings, create_tournament, playable_matches, start_match,
    NewParticipant, Standings,
};
pub use models::{
    GameMatch, GameScore, Group, GroupsConfig, KnockoutConfig, MatchId, MatchResult, MatchStatus,
    Participant, ParticipantId, ParticipantRef, SourceRole, Stage, Tiebreaker, Tournament,
    TournamentConfig,
    TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
