//! Tournament, configuration, and error types.

use crate::models::game::{GameMatch, MatchId, ParticipantRef};
use crate::models::group::Group;
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Errors that can occur while building or progressing a tournament.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Malformed input: bad participant count, seed, config value, or result payload.
    InvalidInput(String),
    /// Format id not in the supported catalog.
    FormatUnsupported(String),
    /// Fewer than the minimum participants for the format.
    InsufficientParticipants { required: usize, actual: usize },
    /// Participant names are unique, case-insensitive.
    DuplicateParticipantName(String),
    /// No match with this id in the tournament.
    MatchNotFound(MatchId),
    /// Result submitted for a match whose slots are not yet resolved.
    NotReady(MatchId),
    /// Result submitted for a match already in a terminal status.
    AlreadyCompleted(MatchId),
    /// A placeholder references a match that does not exist. Builder defect,
    /// never a recoverable runtime condition.
    DanglingReference(String),
    /// Tournament is not in a status that allows this action.
    InvalidState,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            TournamentError::FormatUnsupported(id) => write!(f, "Unsupported format: {}", id),
            TournamentError::InsufficientParticipants { required, actual } => {
                write!(f, "Need at least {} participants (got {})", required, actual)
            }
            TournamentError::DuplicateParticipantName(name) => {
                write!(f, "Duplicate participant name: {}", name)
            }
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::NotReady(id) => write!(f, "Match {} is not ready for a result", id),
            TournamentError::AlreadyCompleted(id) => write!(f, "Match {} already has a result", id),
            TournamentError::DanglingReference(msg) => {
                write!(f, "Dangling match reference: {}", msg)
            }
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Supported tournament formats. Closed set: every format dispatch matches
/// exhaustively over this enum.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    SingleElimination,
    RoundRobin,
    Monrad,
    PoolsKnockout,
}

impl TournamentFormat {
    pub fn id(self) -> &'static str {
        match self {
            TournamentFormat::SingleElimination => "single_elimination",
            TournamentFormat::RoundRobin => "round_robin",
            TournamentFormat::Monrad => "monrad",
            TournamentFormat::PoolsKnockout => "pools_knockout",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TournamentFormat::SingleElimination => "Single Elimination",
            TournamentFormat::RoundRobin => "Round Robin",
            TournamentFormat::Monrad => "Monrad / Progressive Consolation",
            TournamentFormat::PoolsKnockout => "Pools → Knockout",
        }
    }

    pub fn parse(id: &str) -> Result<Self, TournamentError> {
        match id {
            "single_elimination" => Ok(TournamentFormat::SingleElimination),
            "round_robin" => Ok(TournamentFormat::RoundRobin),
            "monrad" => Ok(TournamentFormat::Monrad),
            "pools_knockout" => Ok(TournamentFormat::PoolsKnockout),
            other => Err(TournamentError::FormatUnsupported(other.to_string())),
        }
    }

    pub fn all() -> [TournamentFormat; 4] {
        [
            TournamentFormat::SingleElimination,
            TournamentFormat::RoundRobin,
            TournamentFormat::Monrad,
            TournamentFormat::PoolsKnockout,
        ]
    }
}

/// Entry in the static format catalog served by the API.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    pub id: String,
    pub name: String,
}

/// Static catalog of supported formats.
pub fn format_catalog() -> Vec<FormatInfo> {
    TournamentFormat::all()
        .into_iter()
        .map(|f| FormatInfo {
            id: f.id().to_string(),
            name: f.display_name().to_string(),
        })
        .collect()
}

/// Tournament lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Cancelled,
}

/// Per-match play rules.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    #[serde(default = "default_best_of")]
    pub best_of: u32,
    #[serde(default = "default_points_to_win")]
    pub points_to_win: u32,
    #[serde(default = "default_clear_points")]
    pub clear_points: u32,
    #[serde(default = "default_scoring")]
    pub scoring: String,
}

fn default_best_of() -> u32 {
    5
}
fn default_points_to_win() -> u32 {
    15
}
fn default_clear_points() -> u32 {
    2
}
fn default_scoring() -> String {
    "traditional".to_string()
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            best_of: default_best_of(),
            points_to_win: default_points_to_win(),
            clear_points: default_clear_points(),
            scoring: default_scoring(),
        }
    }
}

/// Group-stage settings for round_robin and pools_knockout.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupsConfig {
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    #[serde(default = "default_advance_per_group")]
    pub advance_per_group: usize,
    #[serde(default)]
    pub avoid_same_club: bool,
}

fn default_target_size() -> usize {
    4
}
fn default_advance_per_group() -> usize {
    2
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            advance_per_group: default_advance_per_group(),
            avoid_same_club: false,
        }
    }
}

/// Knockout settings for single_elimination and pools_knockout.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutConfig {
    #[serde(default)]
    pub consolation: bool,
    #[serde(default)]
    pub draw_size: Option<usize>,
}

/// Tie-break criteria, applied in configured order to subsets still tied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiebreaker {
    Wins,
    H2h,
    GameDiff,
    PointDiff,
    FewestWalkovers,
    Random,
}

fn default_tiebreakers() -> Vec<Tiebreaker> {
    vec![
        Tiebreaker::Wins,
        Tiebreaker::H2h,
        Tiebreaker::GameDiff,
        Tiebreaker::PointDiff,
        Tiebreaker::FewestWalkovers,
        Tiebreaker::Random,
    ]
}

fn default_courts() -> u32 {
    1
}
fn default_min_rest_minutes() -> u32 {
    20
}
fn default_allow_walkovers() -> bool {
    true
}

/// Tournament configuration. Unknown formats ignore sections they do not use.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    #[serde(rename = "match", default)]
    pub match_rules: MatchRules,
    #[serde(default = "default_courts")]
    pub courts: u32,
    #[serde(default = "default_min_rest_minutes")]
    pub min_rest_minutes: u32,
    #[serde(default = "default_allow_walkovers")]
    pub allow_walkovers: bool,
    #[serde(default = "default_tiebreakers")]
    pub tiebreakers: Vec<Tiebreaker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knockout: Option<KnockoutConfig>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            match_rules: MatchRules::default(),
            courts: default_courts(),
            min_rest_minutes: default_min_rest_minutes(),
            allow_walkovers: default_allow_walkovers(),
            tiebreakers: default_tiebreakers(),
            groups: None,
            knockout: None,
        }
    }
}

impl TournamentConfig {
    /// Basic sanity checks, run before topology construction.
    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.match_rules.best_of == 0 || self.match_rules.best_of % 2 == 0 {
            return Err(TournamentError::InvalidInput(format!(
                "match.best_of must be odd and >= 1 (got {})",
                self.match_rules.best_of
            )));
        }
        if self.courts == 0 {
            return Err(TournamentError::InvalidInput(
                "courts must be >= 1".to_string(),
            ));
        }
        if let Some(groups) = &self.groups {
            if groups.target_size < 2 {
                return Err(TournamentError::InvalidInput(
                    "groups.target_size must be >= 2".to_string(),
                ));
            }
            if groups.advance_per_group == 0 {
                return Err(TournamentError::InvalidInput(
                    "groups.advance_per_group must be >= 1".to_string(),
                ));
            }
        }
        if let Some(knockout) = &self.knockout {
            if let Some(draw) = knockout.draw_size {
                if draw < 2 || !draw.is_power_of_two() {
                    return Err(TournamentError::InvalidInput(format!(
                        "knockout.draw_size must be a power of two >= 2 (got {})",
                        draw
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Carried-forward topology state: the current seed-position → occupant map.
/// Rebuilt deterministically from the match list after every mutation; never
/// trusted as independently-mutable state.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeedState {
    /// Positions in the main bracket (monrad: the whole field; knockout
    /// formats: the draw). Keys are 1-based positions.
    pub seed_positions: BTreeMap<u32, ParticipantRef>,
    /// Size of the position space (next power of two over the entrant count).
    pub bracket_size: u32,
}

/// A tournament: participants, the generated match graph, groups, and the
/// seed-position table needed to resolve future placeholders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub config: TournamentConfig,
    pub participants: Vec<Participant>,
    pub matches: Vec<GameMatch>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(rename = "state_blob", default)]
    pub state: SeedState,
}

impl Tournament {
    /// Create a draft tournament with no matches yet.
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        participants: Vec<Participant>,
        config: TournamentConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            status: TournamentStatus::Draft,
            venue: None,
            description: None,
            start_date: None,
            created_at: Utc::now(),
            config,
            participants,
            matches: Vec::new(),
            groups: Vec::new(),
            state: SeedState::default(),
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participant holding a given seed, if any.
    pub fn participant_by_seed(&self, seed: u32) -> Option<&Participant> {
        self.participants.iter().find(|p| p.seed == seed)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Draft → Active. Requires at least 2 participants.
    pub fn activate(&mut self) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Draft {
            return Err(TournamentError::InvalidState);
        }
        if self.participants.len() < 2 {
            return Err(TournamentError::InsufficientParticipants {
                required: 2,
                actual: self.participants.len(),
            });
        }
        self.status = TournamentStatus::Active;
        Ok(())
    }

    /// Draft or Active → Cancelled.
    pub fn cancel(&mut self) -> Result<(), TournamentError> {
        match self.status {
            TournamentStatus::Draft | TournamentStatus::Active => {
                self.status = TournamentStatus::Cancelled;
                Ok(())
            }
            _ => Err(TournamentError::InvalidState),
        }
    }

    /// True when every match has reached a terminal status.
    pub fn all_matches_terminal(&self) -> bool {
        !self.matches.is_empty() && self.matches.iter().all(|m| m.status.is_terminal())
    }
}
