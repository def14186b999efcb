//! Core record types held in the local store.
//!
//! Six record kinds hang off a canonical [`Contact`]: an append-only
//! provenance log ([`ContactOrigin`]), at most one [`VolunteerProfile`],
//! and any number of [`VolunteerInterest`], [`EventLead`], and
//! [`LiveFollowUp`] rows. Children reference the contact by id only.

use serde::{Deserialize, Serialize};

/// How a contact entered the system. Written once per intake, never updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginKind {
    TeamSignup,
    LiveField,
    EventRequest,
    CsvImport,
    ManualAdmin,
    Unknown,
}

impl OriginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginKind::TeamSignup => "team-signup",
            OriginKind::LiveField => "live-field",
            OriginKind::EventRequest => "event-request",
            OriginKind::CsvImport => "csv-import",
            OriginKind::ManualAdmin => "manual-admin",
            OriginKind::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "team-signup" => Some(OriginKind::TeamSignup),
            "live-field" => Some(OriginKind::LiveField),
            "event-request" => Some(OriginKind::EventRequest),
            "csv-import" => Some(OriginKind::CsvImport),
            "manual-admin" => Some(OriginKind::ManualAdmin),
            "unknown" => Some(OriginKind::Unknown),
            _ => None,
        }
    }
}

/// Follow-up workflow status. Staff may set any status from any status;
/// nothing is blocked, including re-opening a completed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowUpStatus {
    New,
    InProgress,
    Completed,
}

impl FollowUpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpStatus::New => "new",
            FollowUpStatus::InProgress => "in-progress",
            FollowUpStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(FollowUpStatus::New),
            "in-progress" => Some(FollowUpStatus::InProgress),
            "completed" => Some(FollowUpStatus::Completed),
            _ => None,
        }
    }
}

/// Triage status of a venue/event opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    New,
    Triaged,
    Scheduled,
    Declined,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Triaged => "triaged",
            LeadStatus::Scheduled => "scheduled",
            LeadStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "triaged" => Some(LeadStatus::Triaged),
            "scheduled" => Some(LeadStatus::Scheduled),
            "declined" => Some(LeadStatus::Declined),
            _ => None,
        }
    }
}

/// Campaign teams a volunteer can sign up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Team {
    Canvass,
    PhoneBank,
    Events,
    Digital,
    DataEntry,
    Hospitality,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Canvass => "canvass",
            Team::PhoneBank => "phone-bank",
            Team::Events => "events",
            Team::Digital => "digital",
            Team::DataEntry => "data-entry",
            Team::Hospitality => "hospitality",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "canvass" => Some(Team::Canvass),
            "phone-bank" => Some(Team::PhoneBank),
            "events" => Some(Team::Events),
            "digital" => Some(Team::Digital),
            "data-entry" => Some(Team::DataEntry),
            "hospitality" => Some(Team::Hospitality),
            _ => None,
        }
    }
}

/// Canonical person record. At most one per normalized email or phone;
/// repeat intakes merge into the existing row and never erase data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub full_name: String,
    /// Trimmed and lower-cased before storage and matching.
    pub email: Option<String>,
    /// Digits-only before storage and matching.
    pub phone: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: String,
    pub social_connected: bool,
    pub social_handle: Option<String>,
    pub tags: Vec<String>,
}

/// Immutable provenance row: how and when one intake event happened.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactOrigin {
    pub id: String,
    pub contact_id: String,
    pub kind: OriginKind,
    pub origin_ref: Option<String>,
    pub captured_at: i64,
    pub note: Option<String>,
    /// The submission payload exactly as received, JSON text.
    pub raw_payload: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerProfile {
    pub contact_id: String,
    pub availability: Option<String>,
    pub availability_other: Option<String>,
    pub updates_only: bool,
    pub other_note: Option<String>,
    pub event_invite_note: Option<String>,
    pub consent: bool,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerInterest {
    pub id: String,
    pub contact_id: String,
    pub team: Team,
    pub role: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLead {
    pub id: String,
    pub contact_id: String,
    pub description: String,
    pub county: Option<String>,
    pub status: LeadStatus,
    pub created_at: i64,
}

/// Staff work item, one per intake event. Display fields are copies taken
/// at creation time so list rendering needs no join back to the contact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveFollowUp {
    pub id: String,
    pub contact_id: String,
    pub created_at: i64,
    pub status: FollowUpStatus,
    pub notes: String,
    pub completed_at: Option<i64>,
    pub archived: bool,
    pub display_name: String,
    pub display_phone: Option<String>,
    pub display_email: Option<String>,
    pub display_location: Option<String>,
    pub source_label: String,
    pub automation_ok: bool,
    pub consent: bool,
    pub social_connected: bool,
    pub social_handle: Option<String>,
}
