use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LodgeError;

pub type UserId = i64;
pub type MarkerId = i64;
pub type VoteId = i64;

// ---------------------------------------------------------------------------
// Rank / capabilities
// ---------------------------------------------------------------------------

/// Membership rank. Variants are declared lowest first so the derived
/// `Ord` is the rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rank {
    Mason,
    Silver,
    Golden,
    Architect,
}

/// Something a session user may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateMarker,
    DeleteMarker,
    ViewDashboard,
    NominateBan,
    RequestPromotion,
    TriggerCompromised,
    ManageBackups,
}

const MASON_CAPS: &[Capability] = &[Capability::CreateMarker, Capability::RequestPromotion];

const SILVER_CAPS: &[Capability] = &[Capability::CreateMarker, Capability::RequestPromotion];

const GOLDEN_CAPS: &[Capability] = &[
    Capability::CreateMarker,
    Capability::DeleteMarker,
    Capability::ViewDashboard,
    Capability::RequestPromotion,
];

const ARCHITECT_CAPS: &[Capability] = &[
    Capability::CreateMarker,
    Capability::DeleteMarker,
    Capability::ViewDashboard,
    Capability::TriggerCompromised,
    Capability::ManageBackups,
];

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::Mason, Rank::Silver, Rank::Golden, Rank::Architect];

    /// Wire name, as sent by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Mason => "MASON",
            Rank::Silver => "SILVER",
            Rank::Golden => "GOLDEN",
            Rank::Architect => "ARCHITECT",
        }
    }

    /// Human label ("Golden").
    pub fn label(&self) -> &'static str {
        match self {
            Rank::Mason => "Mason",
            Rank::Silver => "Silver",
            Rank::Golden => "Golden",
            Rank::Architect => "Architect",
        }
    }

    /// Capability set granted by this rank.
    ///
    /// `NominateBan` never appears here: it comes from the inquisitor flag,
    /// see [`User::can`].
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Rank::Mason => MASON_CAPS,
            Rank::Silver => SILVER_CAPS,
            Rank::Golden => GOLDEN_CAPS,
            Rank::Architect => ARCHITECT_CAPS,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// The rank a promotion vote would grant, `None` at the top.
    pub fn next(&self) -> Option<Rank> {
        match self {
            Rank::Mason => Some(Rank::Silver),
            Rank::Silver => Some(Rank::Golden),
            Rank::Golden => Some(Rank::Architect),
            Rank::Architect => None,
        }
    }

    pub fn is_top(&self) -> bool {
        self.next().is_none()
    }
}

impl FromStr for Rank {
    type Err = LodgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MASON" => Ok(Rank::Mason),
            "SILVER" => Ok(Rank::Silver),
            "GOLDEN" => Ok(Rank::Golden),
            "ARCHITECT" => Ok(Rank::Architect),
            _ => Err(LodgeError::InvalidRank(s.to_string())),
        }
    }
}

impl From<String> for Rank {
    /// Unknown role names (legacy `USER`, typos) decode as the base rank.
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Rank::Mason)
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.as_str().to_string()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// The authenticated session user, as returned at login and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Rank,
    #[serde(default)]
    pub is_inquisitor: bool,
    #[serde(default)]
    pub role_assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_promotion_attempt: Option<DateTime<Utc>>,
}

impl User {
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::NominateBan => self.is_inquisitor,
            other => self.role.allows(other),
        }
    }
}

/// Row of the privileged user listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    pub username: String,
    pub role: Rank,
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkerCategory {
    Ghost,
    Ufo,
    Bigfoot,
    Other,
}

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 4] = [
        MarkerCategory::Ghost,
        MarkerCategory::Ufo,
        MarkerCategory::Bigfoot,
        MarkerCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerCategory::Ghost => "ghost",
            MarkerCategory::Ufo => "ufo",
            MarkerCategory::Bigfoot => "bigfoot",
            MarkerCategory::Other => "other",
        }
    }

    /// Icon asset for the pin.
    pub fn icon(&self) -> &'static str {
        match self {
            MarkerCategory::Ghost => "ghost.png",
            MarkerCategory::Ufo => "ufo.png",
            MarkerCategory::Bigfoot => "bigfoot.png",
            MarkerCategory::Other => "other.png",
        }
    }
}

impl FromStr for MarkerCategory {
    type Err = LodgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ghost" => Ok(MarkerCategory::Ghost),
            "ufo" => Ok(MarkerCategory::Ufo),
            "bigfoot" => Ok(MarkerCategory::Bigfoot),
            "other" => Ok(MarkerCategory::Other),
            _ => Err(LodgeError::InvalidCategory(s.to_string())),
        }
    }
}

impl From<String> for MarkerCategory {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(MarkerCategory::Other)
    }
}

impl From<MarkerCategory> for String {
    fn from(category: MarkerCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker as echoed by the backend. The echo of a create may omit `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default)]
    pub id: Option<MarkerId>,
    pub lat: f64,
    pub lng: f64,
    pub name: MarkerCategory,
    #[serde(default)]
    pub user: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMarker {
    pub lat: f64,
    pub lng: f64,
    pub name: MarkerCategory,
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Agree,
    Disagree,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Agree => "AGREE",
            Decision::Disagree => "DISAGREE",
        }
    }
}

impl FromStr for Decision {
    type Err = LodgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AGREE" | "YES" => Ok(Decision::Agree),
            "DISAGREE" | "NO" => Ok(Decision::Disagree),
            _ => Err(LodgeError::InvalidDecision(s.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteType {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    #[serde(default)]
    pub total_cast: u32,
    #[serde(default)]
    pub agree: u32,
    #[serde(default)]
    pub disagree: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub vote_type: VoteType,
    #[serde(default)]
    pub target_username: Option<String>,
    #[serde(default)]
    pub time_remaining_seconds: Option<i64>,
    #[serde(default)]
    pub vote_counts: VoteCounts,
    #[serde(default)]
    pub current_user_vote: Option<Decision>,
}

impl Vote {
    /// Server-reported remaining time; missing or negative reads as zero.
    pub fn remaining_seconds(&self) -> u64 {
        self.time_remaining_seconds.unwrap_or(0).max(0) as u64
    }

    /// "BAN on: tester", "PROMOTE SILVER".
    pub fn title(&self) -> String {
        let kind = self.vote_type.name.replace('_', " ");
        match &self.target_username {
            Some(target) if !target.is_empty() => format!("{kind} on: {target}"),
            _ => kind,
        }
    }

    /// Overlay the fields present in a cast-vote response.
    pub fn merge(&mut self, patch: VotePatch) {
        if let Some(vote_type) = patch.vote_type {
            self.vote_type = vote_type;
        }
        if let Some(target) = patch.target_username {
            self.target_username = target;
        }
        if let Some(remaining) = patch.time_remaining_seconds {
            self.time_remaining_seconds = Some(remaining);
        }
        if let Some(counts) = patch.vote_counts {
            self.vote_counts = counts;
        }
        if let Some(decision) = patch.current_user_vote {
            self.current_user_vote = decision;
        }
    }
}

/// Partial vote returned by mutations.
///
/// Nullable fields are doubly optional: `None` when the key is absent,
/// `Some(None)` when the server sent an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VotePatch {
    #[serde(default)]
    pub vote_type: Option<VoteType>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_username: Option<Option<String>>,
    #[serde(default)]
    pub time_remaining_seconds: Option<i64>,
    #[serde(default)]
    pub vote_counts: Option<VoteCounts>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_user_vote: Option<Option<Decision>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominationReceipt {
    pub id: VoteId,
    #[serde(default)]
    pub target_username: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EntryPasswordRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPasswordResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CastVoteRequest {
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize)]
pub struct NominateBanRequest {
    pub target_user_id: UserId,
}
