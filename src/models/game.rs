//! Match, result, and slot-reference data structures.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Which side of a source match a placeholder refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    Winner,
    Loser,
}

/// What occupies a match slot: a concrete participant, a bye, or a
/// placeholder resolved once upstream play (or a group table) decides it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParticipantRef {
    Participant {
        participant_id: ParticipantId,
    },
    Bye,
    /// Winner or loser of `source_match_id`, destined for bracket position `seed`.
    SeedPosition {
        seed: u32,
        source_match_id: MatchId,
        source_role: SourceRole,
    },
    /// Finisher at `position` of group `group_id` (pools → knockout hand-off).
    GroupPosition {
        group_id: GroupId,
        position: u32,
    },
}

impl ParticipantRef {
    pub fn participant(id: ParticipantId) -> Self {
        ParticipantRef::Participant { participant_id: id }
    }

    pub fn participant_id(&self) -> Option<ParticipantId> {
        match self {
            ParticipantRef::Participant { participant_id } => Some(*participant_id),
            _ => None,
        }
    }

    /// Concrete means the slot needs no further resolution (participant or bye).
    pub fn is_concrete(&self) -> bool {
        matches!(
            self,
            ParticipantRef::Participant { .. } | ParticipantRef::Bye
        )
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, ParticipantRef::Bye)
    }
}

/// Match lifecycle. `live` is advisory (set when play starts) and not
/// required for resolution correctness.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Ready,
    Live,
    Completed,
    Walkover,
    Cancelled,
}

impl MatchStatus {
    /// Terminal statuses accept no further results.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed | MatchStatus::Walkover | MatchStatus::Cancelled
        )
    }
}

/// Phase a match belongs to in hybrid or consolation formats.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Group,
    Knockout,
    Consolation,
}

/// Points in a single game, keyed the way the client scores them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub player1: u32,
    pub player2: u32,
}

/// Outcome of a completed match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_id: ParticipantId,
    pub loser_id: ParticipantId,
    /// Per-game point pairs; empty for walkovers.
    #[serde(default)]
    pub game_scores: Vec<GameScore>,
    #[serde(default)]
    pub walkover: bool,
    #[serde(default)]
    pub retired: bool,
}

/// A single match in the tournament graph.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// 1-based round number.
    pub round: u32,
    /// Dense index within the round, 1-based.
    pub match_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub participant_a: ParticipantRef,
    pub participant_b: ParticipantRef,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    /// Bracket seed position each slot occupies (bracket formats only).
    /// Lets the seed-position table be rebuilt from the match list alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_b: Option<u32>,
}

impl GameMatch {
    pub fn new(round: u32, match_number: u32, a: ParticipantRef, b: ParticipantRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_number,
            stage: None,
            group_id: None,
            participant_a: a,
            participant_b: b,
            status: MatchStatus::Pending,
            result: None,
            position_a: None,
            position_b: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_positions(mut self, a: u32, b: u32) -> Self {
        self.position_a = Some(a);
        self.position_b = Some(b);
        self
    }

    /// What downstream winner-refs to this match resolve to, if decided.
    pub fn winner_ref(&self) -> Option<ParticipantRef> {
        match self.status {
            MatchStatus::Completed | MatchStatus::Walkover => match &self.result {
                Some(r) => Some(ParticipantRef::participant(r.winner_id)),
                // Bye auto-advance: the non-bye side won without play.
                None => {
                    if self.participant_a.is_bye() {
                        Some(self.participant_b.clone())
                    } else {
                        Some(self.participant_a.clone())
                    }
                }
            },
            MatchStatus::Cancelled => Some(ParticipantRef::Bye),
            _ => None,
        }
    }

    /// What downstream loser-refs to this match resolve to, if decided.
    pub fn loser_ref(&self) -> Option<ParticipantRef> {
        match self.status {
            MatchStatus::Completed | MatchStatus::Walkover => match &self.result {
                Some(r) => Some(ParticipantRef::participant(r.loser_id)),
                // The bye "loses" a bye auto-advance and keeps flowing downstream.
                None => Some(ParticipantRef::Bye),
            },
            MatchStatus::Cancelled => Some(ParticipantRef::Bye),
            _ => None,
        }
    }
}
