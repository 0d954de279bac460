//! Audit trail constants, change diffs, redaction and the integrity hash chain.
//!
//! Every mutation in the API writes one append-only audit entry. Updates carry
//! a `changes` object in their details so that revision history can be
//! reconstructed later (see [`crate::revision`]).

use serde_json::{Map, Value};

use crate::hashing;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod action_types {
    pub const REPORT_CREATE: &str = "report_create";
    pub const REPORT_UPDATE: &str = "report_update";
    pub const REPORT_DELETE: &str = "report_delete";
    pub const REPORT_SUBMIT: &str = "report_submit";
    pub const REPORT_APPROVE: &str = "report_approve";
    pub const REPORT_REQUEST_REVISION: &str = "report_request_revision";
    pub const REPORT_REOPEN: &str = "report_reopen";
    pub const REPORT_FINALISE: &str = "report_finalise";
    pub const REPORT_ARCHIVE: &str = "report_archive";

    pub const ENTITY_CREATE: &str = "entity_create";
    pub const ENTITY_UPDATE: &str = "entity_update";
    pub const ENTITY_DELETE: &str = "entity_delete";
    pub const PHOTO_UPLOAD: &str = "photo_upload";

    pub const SHARE_CREATE: &str = "share_create";
    pub const SHARE_REVOKE: &str = "share_revoke";
    pub const SHARE_ACCESS: &str = "share_access";

    pub const COMPLAINT_CREATE: &str = "complaint_create";
    pub const COMPLAINT_UPDATE: &str = "complaint_update";
    pub const COMPLAINT_SUBMIT_FOR_REVIEW: &str = "complaint_submit_for_review";
    pub const COMPLAINT_APPROVE: &str = "complaint_approve";
    pub const COMPLAINT_RETURN: &str = "complaint_return";
    pub const COMPLAINT_SUBMIT: &str = "complaint_submit";

    pub const USER_CREATE: &str = "user_create";
    pub const USER_UPDATE: &str = "user_update";

    pub const INSPECTION_REQUEST_CREATE: &str = "inspection_request_create";
    pub const INSPECTION_REQUEST_CONVERT: &str = "inspection_request_convert";
    pub const INSPECTION_REQUEST_DECLINE: &str = "inspection_request_decline";

    pub const PDF_GENERATE: &str = "pdf_generate";
}

/// Entity type names recorded on audit entries.
pub mod entity_types {
    pub const REPORT: &str = "report";
    pub const ROOF_ELEMENT: &str = "roof_element";
    pub const DEFECT: &str = "defect";
    pub const PHOTO: &str = "photo";
    pub const COMPLIANCE_ASSESSMENT: &str = "compliance_assessment";
    pub const ASSIGNMENT: &str = "assignment";
    pub const TEMPLATE: &str = "report_template";
    pub const SHARE: &str = "report_share";
    pub const COMPLAINT: &str = "lbp_complaint";
    pub const USER: &str = "user";
    pub const INSPECTION_REQUEST: &str = "inspection_request";
}

/// Whether the action is a reviewer decision on a submitted report.
pub fn is_review_outcome(action_type: &str) -> bool {
    matches!(
        action_type,
        action_types::REPORT_APPROVE
            | action_types::REPORT_REQUEST_REVISION
            | action_types::REPORT_REOPEN
    )
}

// ---------------------------------------------------------------------------
// Change diffs
// ---------------------------------------------------------------------------

/// Shallow diff between two JSON objects.
///
/// Returns `{ field: { "old": before, "new": after } }` for every top-level
/// key whose value differs. Keys absent on one side are treated as `null`.
/// Non-object inputs produce an empty object.
pub fn compute_changes(before: &Value, after: &Value) -> Value {
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut changes = Map::new();
    let keys = before.keys().chain(after.keys().filter(|k| !before.contains_key(*k)));
    for key in keys {
        let old = before.get(key).unwrap_or(&Value::Null);
        let new = after.get(key).unwrap_or(&Value::Null);
        if old != new {
            let mut pair = Map::new();
            pair.insert("old".into(), old.clone());
            pair.insert("new".into(), new.clone());
            changes.insert(key.clone(), Value::Object(pair));
        }
    }
    Value::Object(changes)
}

/// Fields that never contribute to a change diff.
pub const UNTRACKED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// Remove bookkeeping fields from a serialized record before diffing.
pub fn strip_untracked(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !UNTRACKED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Fields that should be redacted from audit log details before storage.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "private_key",
    "authorization",
    "credential",
];

/// Redact sensitive fields from a JSON value, recursing into objects and arrays.
///
/// Any key whose lowercase name contains one of [`SENSITIVE_FIELDS`] has its
/// value replaced with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_fields).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Integrity hash chain
// ---------------------------------------------------------------------------

/// Known seed value for the first entry in the hash chain.
const CHAIN_SEED: &str = "ROOFLINE_AUDIT_CHAIN_V1";

/// Compute the SHA-256 integrity hash for an audit log entry.
///
/// `prev_hash` is the hash of the previous entry, or `None` for the first
/// entry (which chains from a fixed seed).
pub fn compute_integrity_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let prev = prev_hash.unwrap_or(CHAIN_SEED);
    let combined = format!("{prev}|{entry_data}");
    hashing::sha256_hex(combined.as_bytes())
}

/// Canonical string form of an entry's content used as hash input.
///
/// Timestamps are rendered with microsecond precision to match what
/// PostgreSQL `TIMESTAMPTZ` stores.
pub fn canonical_entry_data(
    timestamp: Timestamp,
    user_id: Option<DbId>,
    action_type: &str,
    entity_type: Option<&str>,
    entity_id: Option<DbId>,
    details: Option<&Value>,
) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
        user_id.map(|id| id.to_string()).unwrap_or_default(),
        action_type,
        entity_type.unwrap_or_default(),
        entity_id.map(|id| id.to_string()).unwrap_or_default(),
        details.map(|d| d.to_string()).unwrap_or_default(),
    )
}

/// One link of the chain as stored: its canonical data and recorded hash.
#[derive(Debug, Clone)]
pub struct ChainLink {
    pub id: DbId,
    pub canonical_data: String,
    pub integrity_hash: Option<String>,
}

/// Outcome of replaying the chain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChainVerification {
    pub verified_entries: i64,
    pub chain_valid: bool,
    pub first_break: Option<DbId>,
}

/// Replay the hash chain from the seed, stopping at the first mismatch.
///
/// Links must be in insertion (id) order.
pub fn verify_chain(links: &[ChainLink]) -> ChainVerification {
    let mut prev: Option<String> = None;
    let mut verified = 0;

    for link in links {
        let expected = compute_integrity_hash(prev.as_deref(), &link.canonical_data);
        if link.integrity_hash.as_deref() != Some(expected.as_str()) {
            return ChainVerification {
                verified_entries: verified,
                chain_valid: false,
                first_break: Some(link.id),
            };
        }
        verified += 1;
        prev = Some(expected);
    }

    ChainVerification {
        verified_entries: verified,
        chain_valid: true,
        first_break: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    // -----------------------------------------------------------------------
    // compute_changes
    // -----------------------------------------------------------------------

    #[test]
    fn changes_list_only_differing_keys() {
        let before = json!({"title": "Rust", "severity": "minor", "notes": null});
        let after = json!({"title": "Rust", "severity": "major", "notes": "Check"});
        let changes = compute_changes(&before, &after);
        assert_eq!(
            changes,
            json!({
                "severity": {"old": "minor", "new": "major"},
                "notes": {"old": null, "new": "Check"}
            })
        );
    }

    #[test]
    fn added_and_removed_keys_diff_against_null() {
        let changes = compute_changes(&json!({"a": 1}), &json!({"b": 2}));
        assert_eq!(changes["a"], json!({"old": 1, "new": null}));
        assert_eq!(changes["b"], json!({"old": null, "new": 2}));
    }

    #[test]
    fn identical_objects_yield_empty_diff() {
        let v = json!({"x": [1, 2]});
        assert_eq!(compute_changes(&v, &v), json!({}));
    }

    #[test]
    fn strip_untracked_drops_bookkeeping() {
        let v = json!({"id": 1, "updated_at": "t", "title": "x"});
        assert_eq!(strip_untracked(&v), json!({"title": "x"}));
    }

    // -----------------------------------------------------------------------
    // Redaction
    // -----------------------------------------------------------------------

    #[test]
    fn redacts_nested_token_fields() {
        let input = json!({"share": {"token": "abc", "recipient_email": "a@b.nz"}});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["share"]["token"], "[REDACTED]");
        assert_eq!(result["share"]["recipient_email"], "a@b.nz");
    }

    #[test]
    fn redacts_inside_arrays() {
        let input = json!([{"client_secret": "x"}, {"data": "visible"}]);
        let result = redact_sensitive_fields(&input);
        assert_eq!(result[0]["client_secret"], "[REDACTED]");
        assert_eq!(result[1]["data"], "visible");
    }

    // -----------------------------------------------------------------------
    // Hash chain
    // -----------------------------------------------------------------------

    #[test]
    fn chained_hash_depends_on_previous() {
        let first = compute_integrity_hash(None, "entry_1");
        let second = compute_integrity_hash(Some(&first), "entry_2");
        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
        assert_ne!(
            compute_integrity_hash(Some("a"), "same"),
            compute_integrity_hash(Some("b"), "same")
        );
    }

    #[test]
    fn canonical_data_is_stable() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        let data = canonical_entry_data(
            ts,
            Some(7),
            action_types::REPORT_SUBMIT,
            Some(entity_types::REPORT),
            Some(12),
            Some(&json!({"comment": "ok"})),
        );
        assert_eq!(
            data,
            "2026-02-03T04:05:06.000000Z|7|report_submit|report|12|{\"comment\":\"ok\"}"
        );
        let anonymous = canonical_entry_data(ts, None, "share_access", None, None, None);
        assert!(anonymous.ends_with("||share_access|||"));
    }

    fn build_chain(data: &[&str]) -> Vec<ChainLink> {
        let mut prev: Option<String> = None;
        data.iter()
            .enumerate()
            .map(|(i, d)| {
                let hash = compute_integrity_hash(prev.as_deref(), d);
                prev = Some(hash.clone());
                ChainLink {
                    id: i as DbId + 1,
                    canonical_data: d.to_string(),
                    integrity_hash: Some(hash),
                }
            })
            .collect()
    }

    #[test]
    fn intact_chain_verifies() {
        let chain = build_chain(&["a", "b", "c"]);
        let result = verify_chain(&chain);
        assert!(result.chain_valid);
        assert_eq!(result.verified_entries, 3);
        assert_eq!(result.first_break, None);
    }

    #[test]
    fn tampered_entry_breaks_chain() {
        let mut chain = build_chain(&["a", "b", "c"]);
        chain[1].canonical_data = "tampered".into();
        let result = verify_chain(&chain);
        assert!(!result.chain_valid);
        assert_eq!(result.verified_entries, 1);
        assert_eq!(result.first_break, Some(2));
    }

    #[test]
    fn review_outcomes_recognised() {
        assert!(is_review_outcome(action_types::REPORT_APPROVE));
        assert!(is_review_outcome(action_types::REPORT_REOPEN));
        assert!(!is_review_outcome(action_types::REPORT_SUBMIT));
    }
}
