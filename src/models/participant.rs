//! Participant data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in matches and lookups).
pub type ParticipantId = Uuid;

/// A tournament participant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Seed rank, 1 = strongest. Unique within a tournament.
    pub seed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
    /// Display color assigned at entry (carried through for the client).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Participant {
    /// Create a new participant with the given name and seed.
    pub fn new(name: impl Into<String>, seed: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed,
            club: None,
            color: None,
        }
    }

    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.club = Some(club.into());
        self
    }
}
