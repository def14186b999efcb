use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::open(&config.db.path).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates all tables if they do not already exist. Safe to run repeatedly.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Canonical person records. Dedup is by normalized email or phone,
    // enforced by the store's lookup-then-merge, not by a constraint.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            full_name TEXT NOT NULL DEFAULT '',
            email TEXT,
            phone TEXT,
            city TEXT,
            county TEXT,
            state TEXT NOT NULL,
            social_connected INTEGER NOT NULL DEFAULT 0,
            social_handle TEXT,
            tags TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Append-only provenance log, one row per intake event.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_origins (
            id TEXT PRIMARY KEY,
            contact_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            origin_ref TEXT,
            captured_at INTEGER NOT NULL,
            note TEXT,
            raw_payload TEXT NOT NULL DEFAULT '{}',
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // At most one profile per contact; a new submission replaces the row.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS volunteer_profiles (
            contact_id TEXT PRIMARY KEY,
            availability TEXT,
            availability_other TEXT,
            updates_only INTEGER NOT NULL DEFAULT 0,
            other_note TEXT,
            event_invite_note TEXT,
            consent INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS volunteer_interests (
            id TEXT PRIMARY KEY,
            contact_id TEXT NOT NULL,
            team TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_leads (
            id TEXT PRIMARY KEY,
            contact_id TEXT NOT NULL,
            description TEXT NOT NULL,
            county TEXT,
            status TEXT NOT NULL DEFAULT 'new',
            created_at INTEGER NOT NULL,
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Staff work items. Display fields are denormalized at creation so the
    // board renders without joins.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS live_follow_ups (
            id TEXT PRIMARY KEY,
            contact_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            notes TEXT NOT NULL DEFAULT '',
            completed_at INTEGER,
            archived INTEGER NOT NULL DEFAULT 0,
            display_name TEXT NOT NULL DEFAULT '',
            display_phone TEXT,
            display_email TEXT,
            display_location TEXT,
            source_label TEXT NOT NULL DEFAULT '',
            automation_ok INTEGER NOT NULL DEFAULT 0,
            consent INTEGER NOT NULL DEFAULT 0,
            social_connected INTEGER NOT NULL DEFAULT 0,
            social_handle TEXT,
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the store's lookup paths
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_phone ON contacts(phone)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_origins_contact_id ON contact_origins(contact_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_interests_contact_id ON volunteer_interests(contact_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_follow_ups_created_at ON live_follow_ups(created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
