//! Intake pipeline orchestration.
//!
//! [`process_intake`] is the sole entry point that turns one submission
//! into durable records: upsert the contact, append the origin row, attach
//! optional volunteer and event-lead detail, create the follow-up, then
//! offer a bundle to the remote sync channel. The steps are independent
//! writes with no cross-record transaction: a failure partway through
//! leaves the earlier records in place, and resubmitting the intake is the
//! supported recovery (the contact merges, a second origin row records the
//! retry).

use anyhow::Result;
use std::sync::Arc;

use crate::models::{Contact, FollowUpStatus, OriginKind, Team};
use crate::store::{
    ContactFields, ContactStore, EventLeadParams, FollowUpInput, OriginParams,
    VolunteerProfileInput,
};
use crate::sync::{FollowUpBundle, SyncChannel, BUNDLE_VERSION};

/// One intake event, already validated and mapped by a form module (or
/// assembled directly by the CLI and importer).
#[derive(Debug, Clone)]
pub struct IntakeRequest {
    pub origin_kind: OriginKind,
    pub origin_ref: Option<String>,
    pub origin_note: Option<String>,
    /// The submission payload exactly as received.
    pub raw_payload: serde_json::Value,
    pub contact: ContactFields,
    pub follow_up: FollowUpFields,
    pub volunteer: Option<VolunteerExtras>,
    pub event_lead: Option<EventLeadExtras>,
}

#[derive(Debug, Clone, Default)]
pub struct FollowUpFields {
    pub notes: Option<String>,
    pub location: Option<String>,
    pub source_label: Option<String>,
    /// Defaults to true when omitted. When false the follow-up is created
    /// already completed, with a completion timestamp.
    pub follow_up_needed: Option<bool>,
    pub automation_ok: Option<bool>,
    pub consent: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct VolunteerExtras {
    pub profile: Option<VolunteerProfileInput>,
    pub interests: Vec<(Team, String)>,
}

#[derive(Debug, Clone)]
pub struct EventLeadExtras {
    pub description: String,
    pub county: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub contact: Contact,
    pub origin_id: String,
    pub follow_up_id: String,
}

fn default_source_label(kind: OriginKind) -> &'static str {
    match kind {
        OriginKind::TeamSignup => "Team signup form",
        OriginKind::LiveField => "Live field capture",
        OriginKind::EventRequest => "Event request form",
        OriginKind::CsvImport => "CSV import",
        OriginKind::ManualAdmin => "Manual entry",
        OriginKind::Unknown => "Unknown",
    }
}

pub async fn process_intake(
    store: &ContactStore,
    sync: Arc<dyn SyncChannel>,
    req: IntakeRequest,
) -> Result<IntakeOutcome> {
    // 1. Contact: merge into an existing record or create one.
    let contact = store.upsert_contact(&req.contact).await?;

    // 2. Origin: one immutable provenance row per intake event.
    let origin = store
        .add_origin(&OriginParams {
            contact_id: contact.id.clone(),
            kind: req.origin_kind,
            origin_ref: req.origin_ref.clone(),
            note: req.origin_note.clone(),
            raw_payload: serde_json::to_string(&req.raw_payload)?,
        })
        .await?;

    // 3. Volunteer detail, when supplied.
    if let Some(ref volunteer) = req.volunteer {
        if let Some(ref profile) = volunteer.profile {
            store.upsert_volunteer_profile(&contact.id, profile).await?;
        }
        if !volunteer.interests.is_empty() {
            store
                .replace_volunteer_interests(&contact.id, &volunteer.interests)
                .await?;
        }
    }

    // 4. Event lead, when a description survives trimming.
    if let Some(ref lead) = req.event_lead {
        let description = lead.description.trim();
        if !description.is_empty() {
            store
                .add_event_lead(&EventLeadParams {
                    contact_id: contact.id.clone(),
                    description: description.to_string(),
                    county: lead.county.clone().or_else(|| contact.county.clone()),
                })
                .await?;
        }
    }

    // 5. Follow-up, denormalized from the merged contact.
    let needed = req.follow_up.follow_up_needed.unwrap_or(true);
    let (status, completed_at) = if needed {
        (FollowUpStatus::New, None)
    } else {
        (
            FollowUpStatus::Completed,
            Some(chrono::Utc::now().timestamp()),
        )
    };

    let display_location = req
        .follow_up
        .location
        .clone()
        .or_else(|| contact.city.clone());
    let source_label = req
        .follow_up
        .source_label
        .clone()
        .unwrap_or_else(|| default_source_label(req.origin_kind).to_string());

    let follow_up = store
        .add_live_follow_up(&FollowUpInput {
            contact_id: contact.id.clone(),
            status,
            notes: req.follow_up.notes.clone().unwrap_or_default(),
            completed_at,
            display_name: contact.full_name.clone(),
            display_phone: contact.phone.clone(),
            display_email: contact.email.clone(),
            display_location,
            source_label,
            automation_ok: req.follow_up.automation_ok.unwrap_or(false),
            consent: req.follow_up.consent.unwrap_or(false),
            social_connected: contact.social_connected,
            social_handle: contact.social_handle.clone(),
        })
        .await?;

    // 6. Best-effort remote push, off the caller's task. Lost on process
    // exit; that is within the contract.
    let bundle = FollowUpBundle {
        version: BUNDLE_VERSION,
        origin_type: req.origin_kind,
        origin_ref: req.origin_ref,
        origin_id: origin.id.clone(),
        follow_up_id: follow_up.id.clone(),
        contact: contact.clone(),
        follow_up: follow_up.clone(),
        raw_payload: req.raw_payload,
        created_at: follow_up.created_at,
    };
    tokio::spawn(async move {
        sync.push(bundle).await;
    });

    Ok(IntakeOutcome {
        contact,
        origin_id: origin.id,
        follow_up_id: follow_up.id,
    })
}
