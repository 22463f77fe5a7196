//! Round-robin groups for the group and pools formats.

use crate::models::game::{GroupId, MatchId};
use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A round-robin group. Matches live on the tournament; the group only
/// records which ids belong to it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub participant_ids: Vec<ParticipantId>,
    pub match_ids: Vec<MatchId>,
}

impl Group {
    pub fn new(name: impl Into<String>, participant_ids: Vec<ParticipantId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            participant_ids,
            match_ids: Vec::new(),
        }
    }
}

/// One row of a computed group table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStandingRow {
    pub participant_id: ParticipantId,
    pub name: String,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub game_differential: i32,
    pub point_differential: i32,
    /// 1-based rank after the tie-break chain.
    pub position: u32,
    pub qualified: bool,
}
