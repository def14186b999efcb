//! SQLite-backed contact store.
//!
//! [`ContactStore`] wraps a [`SqlitePool`] and owns the dedup/merge policy
//! for contacts plus CRUD for the five dependent record kinds. Callers go
//! through these methods; the raw tables are never exposed. The store is
//! single-writer by deployment (one database file per office device), so no
//! conflict handling exists beyond SQLite's own transaction semantics.

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{
    Contact, ContactOrigin, EventLead, FollowUpStatus, LeadStatus, LiveFollowUp, OriginKind, Team,
    VolunteerInterest, VolunteerProfile,
};

/// Incoming contact fields from one intake. Every field is optional: empty
/// or absent fields never overwrite stored values on merge.
#[derive(Debug, Clone, Default)]
pub struct ContactFields {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub social_connected: Option<bool>,
    pub social_handle: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OriginParams {
    pub contact_id: String,
    pub kind: OriginKind,
    pub origin_ref: Option<String>,
    pub note: Option<String>,
    pub raw_payload: String,
}

#[derive(Debug, Clone, Default)]
pub struct VolunteerProfileInput {
    pub availability: Option<String>,
    pub availability_other: Option<String>,
    pub updates_only: bool,
    pub other_note: Option<String>,
    pub event_invite_note: Option<String>,
    pub consent: bool,
}

#[derive(Debug, Clone)]
pub struct EventLeadParams {
    pub contact_id: String,
    pub description: String,
    pub county: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FollowUpInput {
    pub contact_id: String,
    pub status: FollowUpStatus,
    pub notes: String,
    pub completed_at: Option<i64>,
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

/// Allow-listed follow-up edits. Only these three fields are staff-mutable;
/// everything else on the row is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct FollowUpPatch {
    pub status: Option<FollowUpStatus>,
    pub notes: Option<String>,
    pub archived: Option<bool>,
}

/// Trim + lowercase; empty becomes `None`.
pub fn normalize_email(raw: Option<&str>) -> Option<String> {
    let e = raw?.trim().to_lowercase();
    if e.is_empty() {
        None
    } else {
        Some(e)
    }
}

/// Strip everything but ASCII digits; empty becomes `None`.
pub fn normalize_phone(raw: Option<&str>) -> Option<String> {
    let p: String = raw?.chars().filter(|c| c.is_ascii_digit()).collect();
    if p.is_empty() {
        None
    } else {
        Some(p)
    }
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct ContactStore {
    pool: SqlitePool,
    default_state: String,
}

impl ContactStore {
    pub fn new(pool: SqlitePool, default_state: impl Into<String>) -> Self {
        Self {
            pool,
            default_state: default_state.into(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Looks up an existing contact by normalized email, then by normalized
    /// phone, and merges the incoming fields into the first hit. Creates a
    /// fresh contact when neither matches. Merge is non-destructive: only
    /// non-empty incoming fields overwrite; tags are unioned.
    pub async fn upsert_contact(&self, input: &ContactFields) -> Result<Contact> {
        let email = normalize_email(input.email.as_deref());
        let phone = normalize_phone(input.phone.as_deref());
        let now = chrono::Utc::now().timestamp();

        let existing = self.find_by_email_or_phone(&email, &phone).await?;

        let mut contact = match existing {
            Some(c) => c,
            None => Contact {
                id: Uuid::new_v4().to_string(),
                created_at: now,
                updated_at: now,
                full_name: String::new(),
                email: None,
                phone: None,
                city: None,
                county: None,
                state: self.default_state.clone(),
                social_connected: false,
                social_handle: None,
                tags: Vec::new(),
            },
        };

        if let Some(name) = non_empty(&input.full_name) {
            contact.full_name = name;
        }
        if email.is_some() {
            contact.email = email;
        }
        if phone.is_some() {
            contact.phone = phone;
        }
        if let Some(city) = non_empty(&input.city) {
            contact.city = Some(city);
        }
        if let Some(county) = non_empty(&input.county) {
            contact.county = Some(county);
        }
        if let Some(state) = non_empty(&input.state) {
            contact.state = state;
        }
        if let Some(connected) = input.social_connected {
            contact.social_connected = connected;
        }
        if let Some(handle) = non_empty(&input.social_handle) {
            contact.social_handle = Some(handle);
        }
        for tag in &input.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !contact.tags.iter().any(|t| t == tag) {
                contact.tags.push(tag.to_string());
            }
        }
        contact.updated_at = now;

        let tags_json = serde_json::to_string(&contact.tags)?;
        sqlx::query(
            r#"
            INSERT INTO contacts (id, created_at, updated_at, full_name, email, phone,
                                  city, county, state, social_connected, social_handle, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                updated_at = excluded.updated_at,
                full_name = excluded.full_name,
                email = excluded.email,
                phone = excluded.phone,
                city = excluded.city,
                county = excluded.county,
                state = excluded.state,
                social_connected = excluded.social_connected,
                social_handle = excluded.social_handle,
                tags = excluded.tags
            "#,
        )
        .bind(&contact.id)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .bind(&contact.full_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.city)
        .bind(&contact.county)
        .bind(&contact.state)
        .bind(contact.social_connected)
        .bind(&contact.social_handle)
        .bind(&tags_json)
        .execute(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn find_by_email_or_phone(
        &self,
        email: &Option<String>,
        phone: &Option<String>,
    ) -> Result<Option<Contact>> {
        // Email checked before phone; the first hit wins.
        if let Some(email) = email {
            let row = sqlx::query("SELECT * FROM contacts WHERE email = ? LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = row {
                return Ok(Some(contact_from_row(&row)));
            }
        }
        if let Some(phone) = phone {
            let row = sqlx::query("SELECT * FROM contacts WHERE phone = ? LIMIT 1")
                .bind(phone)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = row {
                return Ok(Some(contact_from_row(&row)));
            }
        }
        Ok(None)
    }

    pub async fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        let row = sqlx::query("SELECT * FROM contacts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(contact_from_row))
    }

    /// Unconditional insert of one provenance row. Accepts any raw payload.
    pub async fn add_origin(&self, params: &OriginParams) -> Result<ContactOrigin> {
        let origin = ContactOrigin {
            id: Uuid::new_v4().to_string(),
            contact_id: params.contact_id.clone(),
            kind: params.kind,
            origin_ref: params.origin_ref.clone(),
            captured_at: chrono::Utc::now().timestamp(),
            note: params.note.clone(),
            raw_payload: params.raw_payload.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO contact_origins (id, contact_id, kind, origin_ref, captured_at, note, raw_payload)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&origin.id)
        .bind(&origin.contact_id)
        .bind(origin.kind.as_str())
        .bind(&origin.origin_ref)
        .bind(origin.captured_at)
        .bind(&origin.note)
        .bind(&origin.raw_payload)
        .execute(&self.pool)
        .await?;

        Ok(origin)
    }

    pub async fn list_origins(&self, contact_id: &str) -> Result<Vec<ContactOrigin>> {
        let rows = sqlx::query(
            "SELECT * FROM contact_origins WHERE contact_id = ? ORDER BY captured_at DESC, rowid DESC",
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(origin_from_row).collect())
    }

    /// Full replace keyed by contact id.
    pub async fn upsert_volunteer_profile(
        &self,
        contact_id: &str,
        input: &VolunteerProfileInput,
    ) -> Result<VolunteerProfile> {
        let profile = VolunteerProfile {
            contact_id: contact_id.to_string(),
            availability: input.availability.clone(),
            availability_other: input.availability_other.clone(),
            updates_only: input.updates_only,
            other_note: input.other_note.clone(),
            event_invite_note: input.event_invite_note.clone(),
            consent: input.consent,
            updated_at: chrono::Utc::now().timestamp(),
        };

        sqlx::query(
            r#"
            INSERT INTO volunteer_profiles (contact_id, availability, availability_other,
                                            updates_only, other_note, event_invite_note,
                                            consent, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(contact_id) DO UPDATE SET
                availability = excluded.availability,
                availability_other = excluded.availability_other,
                updates_only = excluded.updates_only,
                other_note = excluded.other_note,
                event_invite_note = excluded.event_invite_note,
                consent = excluded.consent,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.contact_id)
        .bind(&profile.availability)
        .bind(&profile.availability_other)
        .bind(profile.updates_only)
        .bind(&profile.other_note)
        .bind(&profile.event_invite_note)
        .bind(profile.consent)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get_volunteer_profile(
        &self,
        contact_id: &str,
    ) -> Result<Option<VolunteerProfile>> {
        let row = sqlx::query("SELECT * FROM volunteer_profiles WHERE contact_id = ?")
            .bind(contact_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(profile_from_row))
    }

    /// Deletes all interest rows for the contact, then inserts one row per
    /// (team, role) pair with a non-empty role after trimming. Pairs failing
    /// that check are dropped silently. Idempotent under repetition.
    pub async fn replace_volunteer_interests(
        &self,
        contact_id: &str,
        pairs: &[(Team, String)],
    ) -> Result<Vec<VolunteerInterest>> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM volunteer_interests WHERE contact_id = ?")
            .bind(contact_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::new();
        for (team, role) in pairs {
            let role = role.trim();
            if role.is_empty() {
                continue;
            }
            let interest = VolunteerInterest {
                id: Uuid::new_v4().to_string(),
                contact_id: contact_id.to_string(),
                team: *team,
                role: role.to_string(),
                created_at: now,
            };
            sqlx::query(
                "INSERT INTO volunteer_interests (id, contact_id, team, role, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&interest.id)
            .bind(&interest.contact_id)
            .bind(interest.team.as_str())
            .bind(&interest.role)
            .bind(interest.created_at)
            .execute(&mut *tx)
            .await?;
            inserted.push(interest);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn list_volunteer_interests(&self, contact_id: &str) -> Result<Vec<VolunteerInterest>> {
        let rows = sqlx::query(
            "SELECT * FROM volunteer_interests WHERE contact_id = ? ORDER BY rowid ASC",
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(interest_from_row).collect())
    }

    /// Inserts a lead with status fixed to `new`.
    pub async fn add_event_lead(&self, params: &EventLeadParams) -> Result<EventLead> {
        let lead = EventLead {
            id: Uuid::new_v4().to_string(),
            contact_id: params.contact_id.clone(),
            description: params.description.clone(),
            county: params.county.clone(),
            status: LeadStatus::New,
            created_at: chrono::Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO event_leads (id, contact_id, description, county, status, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&lead.id)
        .bind(&lead.contact_id)
        .bind(&lead.description)
        .bind(&lead.county)
        .bind(lead.status.as_str())
        .bind(lead.created_at)
        .execute(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn add_live_follow_up(&self, input: &FollowUpInput) -> Result<LiveFollowUp> {
        let follow_up = LiveFollowUp {
            id: Uuid::new_v4().to_string(),
            contact_id: input.contact_id.clone(),
            created_at: chrono::Utc::now().timestamp(),
            status: input.status,
            notes: input.notes.clone(),
            completed_at: input.completed_at,
            archived: false,
            display_name: input.display_name.clone(),
            display_phone: input.display_phone.clone(),
            display_email: input.display_email.clone(),
            display_location: input.display_location.clone(),
            source_label: input.source_label.clone(),
            automation_ok: input.automation_ok,
            consent: input.consent,
            social_connected: input.social_connected,
            social_handle: input.social_handle.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO live_follow_ups (id, contact_id, created_at, status, notes, completed_at,
                                         archived, display_name, display_phone, display_email,
                                         display_location, source_label, automation_ok, consent,
                                         social_connected, social_handle)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&follow_up.id)
        .bind(&follow_up.contact_id)
        .bind(follow_up.created_at)
        .bind(follow_up.status.as_str())
        .bind(&follow_up.notes)
        .bind(follow_up.completed_at)
        .bind(follow_up.archived)
        .bind(&follow_up.display_name)
        .bind(&follow_up.display_phone)
        .bind(&follow_up.display_email)
        .bind(&follow_up.display_location)
        .bind(&follow_up.source_label)
        .bind(follow_up.automation_ok)
        .bind(follow_up.consent)
        .bind(follow_up.social_connected)
        .bind(&follow_up.social_handle)
        .execute(&self.pool)
        .await?;

        Ok(follow_up)
    }

    /// Applies an allow-listed patch. A missing id is a silent no-op
    /// returning `None`. Moving to `completed` stamps `completed_at`;
    /// moving to any other status clears it.
    pub async fn update_live_follow_up(
        &self,
        id: &str,
        patch: &FollowUpPatch,
    ) -> Result<Option<LiveFollowUp>> {
        let row = sqlx::query("SELECT * FROM live_follow_ups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let mut follow_up = match row {
            Some(row) => follow_up_from_row(&row),
            None => return Ok(None),
        };

        if let Some(status) = patch.status {
            follow_up.status = status;
            follow_up.completed_at = if status == FollowUpStatus::Completed {
                Some(chrono::Utc::now().timestamp())
            } else {
                None
            };
        }
        if let Some(ref notes) = patch.notes {
            follow_up.notes = notes.clone();
        }
        if let Some(archived) = patch.archived {
            follow_up.archived = archived;
        }

        sqlx::query(
            "UPDATE live_follow_ups SET status = ?, notes = ?, completed_at = ?, archived = ? WHERE id = ?",
        )
        .bind(follow_up.status.as_str())
        .bind(&follow_up.notes)
        .bind(follow_up.completed_at)
        .bind(follow_up.archived)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(follow_up))
    }

    /// All follow-ups, archived included, newest first.
    pub async fn list_live_follow_ups(&self) -> Result<Vec<LiveFollowUp>> {
        let rows =
            sqlx::query("SELECT * FROM live_follow_ups ORDER BY created_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(follow_up_from_row).collect())
    }

    /// Deletes archived follow-ups only. Returns the number removed.
    pub async fn purge_archived(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM live_follow_ups WHERE archived = 1")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn contact_from_row(row: &sqlx::sqlite::SqliteRow) -> Contact {
    let tags_json: String = row.get("tags");
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    Contact {
        id: row.get("id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        city: row.get("city"),
        county: row.get("county"),
        state: row.get("state"),
        social_connected: row.get("social_connected"),
        social_handle: row.get("social_handle"),
        tags,
    }
}

fn origin_from_row(row: &sqlx::sqlite::SqliteRow) -> ContactOrigin {
    let kind: String = row.get("kind");
    ContactOrigin {
        id: row.get("id"),
        contact_id: row.get("contact_id"),
        kind: OriginKind::parse(&kind).unwrap_or(OriginKind::Unknown),
        origin_ref: row.get("origin_ref"),
        captured_at: row.get("captured_at"),
        note: row.get("note"),
        raw_payload: row.get("raw_payload"),
    }
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> VolunteerProfile {
    VolunteerProfile {
        contact_id: row.get("contact_id"),
        availability: row.get("availability"),
        availability_other: row.get("availability_other"),
        updates_only: row.get("updates_only"),
        other_note: row.get("other_note"),
        event_invite_note: row.get("event_invite_note"),
        consent: row.get("consent"),
        updated_at: row.get("updated_at"),
    }
}

fn interest_from_row(row: &sqlx::sqlite::SqliteRow) -> VolunteerInterest {
    let team: String = row.get("team");
    VolunteerInterest {
        id: row.get("id"),
        contact_id: row.get("contact_id"),
        team: Team::parse(&team).unwrap_or(Team::Canvass),
        role: row.get("role"),
        created_at: row.get("created_at"),
    }
}

fn follow_up_from_row(row: &sqlx::sqlite::SqliteRow) -> LiveFollowUp {
    let status: String = row.get("status");
    LiveFollowUp {
        id: row.get("id"),
        contact_id: row.get("contact_id"),
        created_at: row.get("created_at"),
        status: FollowUpStatus::parse(&status).unwrap_or(FollowUpStatus::New),
        notes: row.get("notes"),
        completed_at: row.get("completed_at"),
        archived: row.get("archived"),
        display_name: row.get("display_name"),
        display_phone: row.get("display_phone"),
        display_email: row.get("display_email"),
        display_location: row.get("display_location"),
        source_label: row.get("source_label"),
        automation_ok: row.get("automation_ok"),
        consent: row.get("consent"),
        social_connected: row.get("social_connected"),
        social_handle: row.get("social_handle"),
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> ContactStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::migrate::apply_schema(&pool).await.unwrap();
    ContactStore::new(pool, "AR")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(email: Option<&str>, phone: Option<&str>) -> ContactFields {
        ContactFields {
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_normalized_email() {
        let store = memory_store().await;

        let first = store.upsert_contact(&fields(Some("a@x.com"), None)).await.unwrap();
        let second = store
            .upsert_contact(&ContactFields {
                email: Some("A@X.com ".to_string()),
                full_name: Some("B".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name, "B");
        assert_eq!(second.email.as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn upsert_matches_by_phone_ignoring_formatting() {
        let store = memory_store().await;

        let first = store
            .upsert_contact(&fields(None, Some("(501) 555-0147")))
            .await
            .unwrap();
        assert_eq!(first.phone.as_deref(), Some("5015550147"));

        let second = store
            .upsert_contact(&fields(None, Some("501-555-0147")))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn merge_never_erases_existing_fields() {
        let store = memory_store().await;

        store
            .upsert_contact(&ContactFields {
                email: Some("a@x.com".to_string()),
                city: Some("Little Rock".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let merged = store.upsert_contact(&fields(Some("a@x.com"), None)).await.unwrap();
        assert_eq!(merged.city.as_deref(), Some("Little Rock"));
    }

    #[tokio::test]
    async fn merge_unions_tags_without_duplicates() {
        let store = memory_store().await;

        store
            .upsert_contact(&ContactFields {
                email: Some("a@x.com".to_string()),
                tags: vec!["volunteer".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        let merged = store
            .upsert_contact(&ContactFields {
                email: Some("a@x.com".to_string()),
                tags: vec!["volunteer".to_string(), "donor".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(merged.tags, vec!["volunteer", "donor"]);
    }

    #[tokio::test]
    async fn new_contact_gets_default_state() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("a@x.com"), None)).await.unwrap();
        assert_eq!(contact.state, "AR");
    }

    #[tokio::test]
    async fn replace_interests_is_idempotent_and_drops_blank_roles() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("v@x.com"), None)).await.unwrap();

        let pairs = vec![
            (Team::Canvass, "Door knocking".to_string()),
            (Team::Events, "  ".to_string()),
            (Team::PhoneBank, "Evening calls".to_string()),
        ];

        store.replace_volunteer_interests(&contact.id, &pairs).await.unwrap();
        let after_twice = store
            .replace_volunteer_interests(&contact.id, &pairs)
            .await
            .unwrap();

        assert_eq!(after_twice.len(), 2);
        let listed = store.list_volunteer_interests(&contact.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|i| i.team == Team::Canvass && i.role == "Door knocking"));
        assert!(listed.iter().any(|i| i.team == Team::PhoneBank && i.role == "Evening calls"));
    }

    #[tokio::test]
    async fn second_profile_submission_fully_replaces_the_first() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("v@x.com"), None)).await.unwrap();

        store
            .upsert_volunteer_profile(
                &contact.id,
                &VolunteerProfileInput {
                    availability: Some("weekends".to_string()),
                    availability_other: Some("school nights in a pinch".to_string()),
                    updates_only: false,
                    other_note: Some("has a truck".to_string()),
                    event_invite_note: None,
                    consent: true,
                },
            )
            .await
            .unwrap();

        store
            .upsert_volunteer_profile(
                &contact.id,
                &VolunteerProfileInput {
                    availability: Some("weekday mornings".to_string()),
                    availability_other: None,
                    updates_only: true,
                    other_note: None,
                    event_invite_note: Some("town halls only".to_string()),
                    consent: true,
                },
            )
            .await
            .unwrap();

        // The stored row is exactly the second submission; fields the first
        // set and the second left empty do not survive the replace.
        let stored = store
            .get_volunteer_profile(&contact.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.availability.as_deref(), Some("weekday mornings"));
        assert!(stored.availability_other.is_none());
        assert!(stored.other_note.is_none());
        assert_eq!(stored.event_invite_note.as_deref(), Some("town halls only"));
        assert!(stored.updates_only);

        assert!(store.get_volunteer_profile("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn event_lead_starts_as_new() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("l@x.com"), None)).await.unwrap();
        let lead = store
            .add_event_lead(&EventLeadParams {
                contact_id: contact.id.clone(),
                description: "VFW hall available on weekends".to_string(),
                county: Some("Pulaski".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(lead.status, LeadStatus::New);
    }

    fn follow_up_input(contact_id: &str) -> FollowUpInput {
        FollowUpInput {
            contact_id: contact_id.to_string(),
            status: FollowUpStatus::New,
            notes: String::new(),
            completed_at: None,
            display_name: "Jane Doe".to_string(),
            display_phone: None,
            display_email: None,
            display_location: None,
            source_label: "Live field".to_string(),
            automation_ok: false,
            consent: false,
            social_connected: false,
            social_handle: None,
        }
    }

    #[tokio::test]
    async fn update_missing_follow_up_is_a_silent_noop() {
        let store = memory_store().await;
        let result = store
            .update_live_follow_up(
                "no-such-id",
                &FollowUpPatch {
                    notes: Some("hello".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn completing_stamps_and_reopening_clears_completed_at() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("f@x.com"), None)).await.unwrap();
        let created = store.add_live_follow_up(&follow_up_input(&contact.id)).await.unwrap();
        assert!(created.completed_at.is_none());

        let completed = store
            .update_live_follow_up(
                &created.id,
                &FollowUpPatch {
                    status: Some(FollowUpStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(completed.completed_at.is_some());

        let reopened = store
            .update_live_follow_up(
                &created.id,
                &FollowUpPatch {
                    status: Some(FollowUpStatus::New),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("f@x.com"), None)).await.unwrap();
        let first = store.add_live_follow_up(&follow_up_input(&contact.id)).await.unwrap();
        let second = store.add_live_follow_up(&follow_up_input(&contact.id)).await.unwrap();

        let listed = store.list_live_follow_ups().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn purge_removes_only_archived_rows() {
        let store = memory_store().await;
        let contact = store.upsert_contact(&fields(Some("f@x.com"), None)).await.unwrap();
        let keep = store.add_live_follow_up(&follow_up_input(&contact.id)).await.unwrap();
        let archived = store.add_live_follow_up(&follow_up_input(&contact.id)).await.unwrap();

        store
            .update_live_follow_up(
                &archived.id,
                &FollowUpPatch {
                    archived: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Archived rows stay in storage until the explicit purge
        assert_eq!(store.list_live_follow_ups().await.unwrap().len(), 2);

        let removed = store.purge_archived().await.unwrap();
        assert_eq!(removed, 1);

        let remaining = store.list_live_follow_ups().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }
}
