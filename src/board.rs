//! Staff follow-up board.
//!
//! Read/mutate surface over follow-up records: the active list partitioned
//! into pending and completed, allow-listed edits, and the archived purge.
//! Used by both the `fdesk followups` CLI commands and the HTTP API.

use anyhow::Result;
use serde::Serialize;

use crate::models::{FollowUpStatus, LiveFollowUp};
use crate::store::{ContactStore, FollowUpPatch};

/// Active (non-archived) follow-ups, newest first within each partition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub pending: Vec<LiveFollowUp>,
    pub completed: Vec<LiveFollowUp>,
}

pub async fn board(store: &ContactStore) -> Result<BoardView> {
    let all = store.list_live_follow_ups().await?;
    let (completed, pending) = all
        .into_iter()
        .filter(|f| !f.archived)
        .partition(|f| f.status == FollowUpStatus::Completed);
    Ok(BoardView { pending, completed })
}

/// Applies an allow-listed patch. Returns `None` for a missing id.
pub async fn apply_patch(
    store: &ContactStore,
    id: &str,
    patch: &FollowUpPatch,
) -> Result<Option<LiveFollowUp>> {
    store.update_live_follow_up(id, patch).await
}

pub async fn purge_archived(store: &ContactStore) -> Result<u64> {
    store.purge_archived().await
}

// ============ CLI entry points ============

/// `fdesk followups list [--all]`
pub async fn run_list(store: &ContactStore, all: bool) -> Result<()> {
    if all {
        let rows = store.list_live_follow_ups().await?;
        println!("--- Follow-ups ({}) ---", rows.len());
        for f in &rows {
            print_follow_up(f);
        }
        return Ok(());
    }

    let view = board(store).await?;
    println!("--- Pending ({}) ---", view.pending.len());
    for f in &view.pending {
        print_follow_up(f);
    }
    println!();
    println!("--- Completed ({}) ---", view.completed.len());
    for f in &view.completed {
        print_follow_up(f);
    }
    Ok(())
}

/// `fdesk followups set-status <id> <status>`
pub async fn run_set_status(store: &ContactStore, id: &str, status: &str) -> Result<()> {
    let status = match FollowUpStatus::parse(status) {
        Some(s) => s,
        None => {
            eprintln!("Error: unknown status '{}'. Use new, in-progress, or completed.", status);
            std::process::exit(1);
        }
    };

    let patch = FollowUpPatch {
        status: Some(status),
        ..Default::default()
    };
    match apply_patch(store, id, &patch).await? {
        Some(updated) => {
            println!("{} -> {}", updated.id, updated.status.as_str());
        }
        None => {
            eprintln!("Error: follow-up not found: {}", id);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// `fdesk followups note <id> <text>`
pub async fn run_note(store: &ContactStore, id: &str, text: &str) -> Result<()> {
    let patch = FollowUpPatch {
        notes: Some(text.to_string()),
        ..Default::default()
    };
    match apply_patch(store, id, &patch).await? {
        Some(updated) => println!("{} notes updated", updated.id),
        None => {
            eprintln!("Error: follow-up not found: {}", id);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// `fdesk followups archive <id>`
pub async fn run_archive(store: &ContactStore, id: &str) -> Result<()> {
    let patch = FollowUpPatch {
        archived: Some(true),
        ..Default::default()
    };
    match apply_patch(store, id, &patch).await? {
        Some(updated) => println!("{} archived", updated.id),
        None => {
            eprintln!("Error: follow-up not found: {}", id);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// `fdesk followups purge`
pub async fn run_purge(store: &ContactStore) -> Result<()> {
    let removed = purge_archived(store).await?;
    println!("purged {} archived follow-up(s)", removed);
    Ok(())
}

fn print_follow_up(f: &LiveFollowUp) {
    println!(
        "[{}] {}  {}  {}",
        f.status.as_str(),
        f.id,
        f.display_name,
        format_ts_iso(f.created_at)
    );
    if let Some(ref phone) = f.display_phone {
        println!("    phone:  {}", phone);
    }
    if let Some(ref email) = f.display_email {
        println!("    email:  {}", email);
    }
    if let Some(ref loc) = f.display_location {
        println!("    where:  {}", loc);
    }
    if !f.notes.is_empty() {
        println!("    notes:  {}", f.notes);
    }
    println!("    source: {}", f.source_label);
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
