//! Form-module registry.
//!
//! Each public intake form is a module keyed by id. A module declares its
//! required fields and maps the validated raw JSON payload into an
//! [`IntakeRequest`] for the pipeline. Validation failures carry one
//! `field: message` string per problem for inline display; payload contents
//! are never echoed back or logged.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::intake::{EventLeadExtras, FollowUpFields, IntakeRequest, VolunteerExtras};
use crate::models::{OriginKind, Team};
use crate::store::{ContactFields, VolunteerProfileInput};

pub const MODULE_IDS: &[&str] = &["event-request", "team-signup", "live-field", "business-card"];

/// `POST /intake` body shape: `{moduleId, data, honeypot?}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub module_id: String,
    pub data: Value,
    #[serde(default)]
    pub honeypot: Option<String>,
}

impl Submission {
    /// Spam heuristic: a filled hidden field means a bot. The caller
    /// responds with a silent success and skips processing.
    pub fn is_spam(&self) -> bool {
        self.honeypot.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

#[derive(Debug)]
pub enum FormError {
    UnknownModule(String),
    Invalid(Vec<String>),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::UnknownModule(id) => write!(f, "unknown form module: {}", id),
            FormError::Invalid(details) => {
                write!(f, "validation failed: {}", details.join("; "))
            }
        }
    }
}

impl std::error::Error for FormError {}

/// Validates `data` against the module's schema and maps it into an
/// [`IntakeRequest`]. `request_id` becomes the origin reference so a staff
/// record can be traced back to the submission.
pub fn build_intake(
    module_id: &str,
    data: &Value,
    request_id: &str,
) -> Result<IntakeRequest, FormError> {
    match module_id {
        "event-request" => build_event_request(data, request_id),
        "team-signup" => build_team_signup(data, request_id),
        "live-field" => build_live_field(data, request_id),
        "business-card" => build_business_card(data, request_id),
        other => Err(FormError::UnknownModule(other.to_string())),
    }
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_field(data: &Value, key: &str) -> Option<bool> {
    data.get(key).and_then(Value::as_bool)
}

fn tags_field(data: &Value) -> Vec<String> {
    data.get("tags")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn require(details: &mut Vec<String>, data: &Value, key: &str) -> Option<String> {
    let value = str_field(data, key);
    if value.is_none() {
        details.push(format!("{}: required", key));
    }
    value
}

fn require_reachable(details: &mut Vec<String>, email: &Option<String>, phone: &Option<String>) {
    if email.is_none() && phone.is_none() {
        details.push("contact: provide an email or a phone number".to_string());
    }
}

fn build_event_request(data: &Value, request_id: &str) -> Result<IntakeRequest, FormError> {
    let mut details = Vec::new();

    let name = require(&mut details, data, "contactName");
    let title = require(&mut details, data, "eventTitle");
    let email = str_field(data, "contactEmail");
    let phone = str_field(data, "contactPhone");
    require_reachable(&mut details, &email, &phone);

    if !details.is_empty() {
        return Err(FormError::Invalid(details));
    }

    let title = title.unwrap_or_default();
    let mut description = title.clone();
    if let Some(event_details) = str_field(data, "eventDetails") {
        description = format!("{} - {}", description, event_details);
    }

    let mut notes = format!("Event request: {}", title);
    if let Some(start) = str_field(data, "startDateTime") {
        notes = format!("{} (starts {})", notes, start);
    }

    Ok(IntakeRequest {
        origin_kind: OriginKind::EventRequest,
        origin_ref: Some(request_id.to_string()),
        origin_note: None,
        raw_payload: data.clone(),
        contact: ContactFields {
            full_name: name,
            email,
            phone,
            city: str_field(data, "city"),
            county: str_field(data, "county"),
            tags: tags_field(data),
            ..Default::default()
        },
        follow_up: FollowUpFields {
            notes: Some(notes),
            location: str_field(data, "venueCity").or_else(|| str_field(data, "city")),
            consent: bool_field(data, "consent"),
            ..Default::default()
        },
        volunteer: None,
        event_lead: Some(EventLeadExtras {
            description,
            county: str_field(data, "county"),
        }),
    })
}

fn build_team_signup(data: &Value, request_id: &str) -> Result<IntakeRequest, FormError> {
    let mut details = Vec::new();

    let name = require(&mut details, data, "fullName");
    let email = str_field(data, "email");
    let phone = str_field(data, "phone");
    require_reachable(&mut details, &email, &phone);

    // Signups are an explicit opt-in; an absent or unchecked consent box
    // is rejected, never recorded as false.
    let consent = bool_field(data, "consent").unwrap_or(false);
    if !consent {
        details.push("consent: required".to_string());
    }

    if !details.is_empty() {
        return Err(FormError::Invalid(details));
    }

    // Unknown teams and blank roles are dropped, never rejected, so a form
    // revision cannot wedge intake.
    let interests: Vec<(Team, String)> = data
        .get("interests")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|entry| {
                    let team = entry.get("team").and_then(Value::as_str)?;
                    let role = entry.get("role").and_then(Value::as_str)?;
                    Some((Team::parse(team)?, role.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    let updates_only = bool_field(data, "updatesOnly").unwrap_or(false);

    Ok(IntakeRequest {
        origin_kind: OriginKind::TeamSignup,
        origin_ref: Some(request_id.to_string()),
        origin_note: None,
        raw_payload: data.clone(),
        contact: ContactFields {
            full_name: name,
            email,
            phone,
            city: str_field(data, "city"),
            county: str_field(data, "county"),
            social_connected: bool_field(data, "socialConnected"),
            social_handle: str_field(data, "socialHandle"),
            tags: tags_field(data),
            ..Default::default()
        },
        follow_up: FollowUpFields {
            notes: str_field(data, "otherNote"),
            consent: Some(consent),
            automation_ok: bool_field(data, "automationOk"),
            // Updates-only signups need no staff outreach.
            follow_up_needed: Some(!updates_only),
            ..Default::default()
        },
        volunteer: Some(VolunteerExtras {
            profile: Some(VolunteerProfileInput {
                availability: str_field(data, "availability"),
                availability_other: str_field(data, "availabilityOther"),
                updates_only,
                other_note: str_field(data, "otherNote"),
                event_invite_note: str_field(data, "eventInviteNote"),
                consent,
            }),
            interests,
        }),
        event_lead: str_field(data, "eventLead").map(|description| EventLeadExtras {
            description,
            county: str_field(data, "county"),
        }),
    })
}

fn build_live_field(data: &Value, request_id: &str) -> Result<IntakeRequest, FormError> {
    let name = str_field(data, "name");
    let phone = str_field(data, "phone");

    if name.is_none() && phone.is_none() {
        return Err(FormError::Invalid(vec![
            "contact: provide a name or a phone number".to_string(),
        ]));
    }

    Ok(IntakeRequest {
        origin_kind: OriginKind::LiveField,
        origin_ref: Some(request_id.to_string()),
        origin_note: str_field(data, "capturedBy").map(|by| format!("captured by {}", by)),
        raw_payload: data.clone(),
        contact: ContactFields {
            full_name: name,
            email: str_field(data, "email"),
            phone,
            city: str_field(data, "city"),
            county: str_field(data, "county"),
            social_connected: bool_field(data, "socialConnected"),
            social_handle: str_field(data, "socialHandle"),
            tags: tags_field(data),
            ..Default::default()
        },
        follow_up: FollowUpFields {
            notes: str_field(data, "notes"),
            location: str_field(data, "location"),
            follow_up_needed: bool_field(data, "followUpNeeded"),
            automation_ok: bool_field(data, "automationOk"),
            consent: bool_field(data, "consent"),
            ..Default::default()
        },
        volunteer: None,
        event_lead: str_field(data, "eventLead").map(|description| EventLeadExtras {
            description,
            county: str_field(data, "county"),
        }),
    })
}

fn build_business_card(data: &Value, request_id: &str) -> Result<IntakeRequest, FormError> {
    let mut details = Vec::new();

    let name = require(&mut details, data, "name");
    let email = str_field(data, "email");
    let phone = str_field(data, "phone");
    require_reachable(&mut details, &email, &phone);

    if !details.is_empty() {
        return Err(FormError::Invalid(details));
    }

    let mut note_parts = Vec::new();
    if let Some(org) = str_field(data, "org") {
        note_parts.push(format!("org: {}", org));
    }
    if let Some(title) = str_field(data, "title") {
        note_parts.push(format!("title: {}", title));
    }
    if let Some(notes) = str_field(data, "notes") {
        note_parts.push(notes);
    }

    Ok(IntakeRequest {
        origin_kind: OriginKind::LiveField,
        origin_ref: Some(request_id.to_string()),
        origin_note: Some("business card".to_string()),
        raw_payload: data.clone(),
        contact: ContactFields {
            full_name: name,
            email,
            phone,
            city: str_field(data, "city"),
            county: str_field(data, "county"),
            tags: tags_field(data),
            ..Default::default()
        },
        follow_up: FollowUpFields {
            notes: if note_parts.is_empty() {
                None
            } else {
                Some(note_parts.join(" - "))
            },
            source_label: Some("Business card".to_string()),
            consent: bool_field(data, "consent"),
            ..Default::default()
        },
        volunteer: None,
        event_lead: None,
    })
}
