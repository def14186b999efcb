//! Bulk contact import.
//!
//! Reads a JSON-lines file (one contact object per line) and runs each row
//! through the standard intake pipeline with origin kind `csv-import` and
//! no follow-up needed, so imported contacts land on the board already
//! completed. Malformed lines are skipped and counted, not fatal.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::intake::{process_intake, FollowUpFields, IntakeRequest};
use crate::models::OriginKind;
use crate::store::{ContactFields, ContactStore};
use crate::sync::SyncChannel;

pub async fn run_import_contacts(
    store: &ContactStore,
    sync: Arc<dyn SyncChannel>,
    path: &Path,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;

    let mut imported = 0u64;
    let mut skipped = 0u64;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(err) => {
                eprintln!("line {}: skipped ({})", line_no + 1, err);
                skipped += 1;
                continue;
            }
        };

        let request = row_to_request(&row);
        match process_intake(store, sync.clone(), request).await {
            Ok(_) => imported += 1,
            Err(err) => {
                eprintln!("line {}: skipped ({})", line_no + 1, err);
                skipped += 1;
            }
        }
    }

    println!("import contacts");
    println!("  imported: {}", imported);
    println!("  skipped:  {}", skipped);
    println!("ok");
    Ok(())
}

fn row_to_request(row: &Value) -> IntakeRequest {
    let field = |key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let tags = row
        .get("tags")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    IntakeRequest {
        origin_kind: OriginKind::CsvImport,
        origin_ref: field("sourceRef"),
        origin_note: None,
        raw_payload: row.clone(),
        contact: ContactFields {
            full_name: field("fullName"),
            email: field("email"),
            phone: field("phone"),
            city: field("city"),
            county: field("county"),
            state: field("state"),
            tags,
            ..Default::default()
        },
        follow_up: FollowUpFields {
            follow_up_needed: Some(false),
            ..Default::default()
        },
        volunteer: None,
        event_lead: None,
    }
}
