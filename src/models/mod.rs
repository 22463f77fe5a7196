//! Data structures for the tournament engine: participants, matches, groups,
//! tournament state and configuration.

mod game;
mod group;
mod participant;
mod tournament;

pub use game::{
    GameMatch, GameScore, GroupId, MatchId, MatchResult, MatchStatus, ParticipantRef, SourceRole,
    Stage,
};
pub use group::{Group, GroupStandingRow};
pub use participant::{Participant, ParticipantId};
pub use tournament::{
    format_catalog, FormatInfo, GroupsConfig, KnockoutConfig, MatchRules, SeedState, Tiebreaker,
    Tournament, TournamentConfig, TournamentError, TournamentFormat, TournamentId,
    TournamentStatus,
};
