//! Revision history reconstruction from a report's audit trail.
//!
//! The audit log is grouped into rounds bounded by `report_submit` entries.
//! Round *k* holds everything recorded after submission *k-1* up to and
//! including submission *k*. Reviewer decisions that follow a submission are
//! attached to that round rather than counted as edits in the next one.
//! Review-side activity (reviewer notes, finalise/archive, shares, PDFs,
//! complaints) also belongs to the latest submitted round and never opens a
//! new one. Anything else recorded after the last submission forms a
//! trailing open round.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::audit::{action_types, is_review_outcome};
use crate::roles::REVIEWER_REPORT_FIELDS;
use crate::types::{DbId, Timestamp};

/// An audit entry as loaded for reconstruction.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details: Option<Value>,
}

/// One field edit as recorded in an entry's `details.changes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub field: String,
    pub old: Value,
    pub new: Value,
    pub changed_by: Option<DbId>,
    pub changed_at: Timestamp,
}

/// The net effect of all edits to one field within a round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetChange {
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// A reviewer decision on a submitted round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub decision: String,
    pub reviewer_id: Option<DbId>,
    pub decided_at: Timestamp,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevisionRound {
    /// 1-based round number.
    pub round: u32,
    pub started_at: Option<Timestamp>,
    /// `None` for the trailing open round.
    pub submitted_at: Option<Timestamp>,
    pub submitted_by: Option<DbId>,
    pub changes: Vec<FieldChange>,
    pub net_changes: Vec<NetChange>,
    pub entities_created: BTreeMap<String, u32>,
    pub entities_deleted: BTreeMap<String, u32>,
    pub entry_count: usize,
    /// The latest reviewer decision on this round.
    pub outcome: Option<ReviewOutcome>,
    /// All reviewer decisions in order (e.g. approve followed by reopen).
    pub decisions: Vec<ReviewOutcome>,
}

impl RevisionRound {
    fn new(round: u32) -> Self {
        Self {
            round,
            started_at: None,
            submitted_at: None,
            submitted_by: None,
            changes: Vec::new(),
            net_changes: Vec::new(),
            entities_created: BTreeMap::new(),
            entities_deleted: BTreeMap::new(),
            entry_count: 0,
            outcome: None,
            decisions: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.submitted_at.is_none()
    }

    fn record(&mut self, entry: &AuditEntry) {
        self.started_at.get_or_insert(entry.timestamp);
        self.entry_count += 1;

        let entity_type = entry.entity_type.clone().unwrap_or_default();
        match entry.action_type.as_str() {
            action_types::ENTITY_CREATE | action_types::PHOTO_UPLOAD => {
                *self.entities_created.entry(entity_type.clone()).or_default() += 1;
            }
            action_types::ENTITY_DELETE => {
                *self.entities_deleted.entry(entity_type.clone()).or_default() += 1;
            }
            _ => {}
        }

        let Some(changes) = entry
            .details
            .as_ref()
            .and_then(|d| d.get("changes"))
            .and_then(Value::as_object)
        else {
            return;
        };

        for (field, pair) in changes {
            self.changes.push(FieldChange {
                entity_type: entity_type.clone(),
                entity_id: entry.entity_id,
                field: field.clone(),
                old: pair.get("old").cloned().unwrap_or(Value::Null),
                new: pair.get("new").cloned().unwrap_or(Value::Null),
                changed_by: entry.user_id,
                changed_at: entry.timestamp,
            });
        }
    }

    fn finish(&mut self) {
        self.net_changes = net_changes(&self.changes);
    }
}

/// Collapse sequential edits into the first `old` and last `new` per
/// `(entity_type, entity_id, field)`, dropping edits that cancel out.
pub fn net_changes(changes: &[FieldChange]) -> Vec<NetChange> {
    let mut order: Vec<(String, Option<DbId>, String)> = Vec::new();
    let mut net: BTreeMap<(String, Option<DbId>, String), NetChange> = BTreeMap::new();

    for c in changes {
        let key = (c.entity_type.clone(), c.entity_id, c.field.clone());
        match net.get_mut(&key) {
            Some(existing) => existing.new = c.new.clone(),
            None => {
                order.push(key.clone());
                net.insert(
                    key,
                    NetChange {
                        entity_type: c.entity_type.clone(),
                        entity_id: c.entity_id,
                        field: c.field.clone(),
                        old: c.old.clone(),
                        new: c.new.clone(),
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| net.remove(&key))
        .filter(|n| n.old != n.new)
        .collect()
}

/// The full revision history of a report.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionHistory {
    pub rounds: Vec<RevisionRound>,
    pub total_submissions: u32,
    /// Number of the round currently in progress or under review.
    pub current_round: u32,
}

fn comment_of(entry: &AuditEntry) -> Option<String> {
    entry
        .details
        .as_ref()
        .and_then(|d| d.get("comment"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Whether the entry is activity on a submitted report rather than inspector
/// work towards the next submission.
fn is_review_side(entry: &AuditEntry) -> bool {
    match entry.action_type.as_str() {
        action_types::REPORT_FINALISE
        | action_types::REPORT_ARCHIVE
        | action_types::SHARE_CREATE
        | action_types::SHARE_REVOKE
        | action_types::SHARE_ACCESS
        | action_types::PDF_GENERATE => true,
        action => {
            if action.starts_with("complaint_") {
                return true;
            }
            action == action_types::REPORT_UPDATE && touches_only_reviewer_fields(entry)
        }
    }
}

fn touches_only_reviewer_fields(entry: &AuditEntry) -> bool {
    entry
        .details
        .as_ref()
        .and_then(|d| d.get("changes"))
        .and_then(Value::as_object)
        .is_some_and(|changes| {
            !changes.is_empty()
                && changes
                    .keys()
                    .all(|field| REVIEWER_REPORT_FIELDS.contains(&field.as_str()))
        })
}

/// Group audit entries into revision rounds.
///
/// Entries may be passed in any order; they are sorted by `(timestamp, id)`.
pub fn reconstruct(mut entries: Vec<AuditEntry>) -> RevisionHistory {
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    let mut rounds: Vec<RevisionRound> = Vec::new();
    let mut current = RevisionRound::new(1);

    for entry in &entries {
        let action = entry.action_type.as_str();

        // Every round in `rounds` is submitted, so the last one is the round
        // most recently handed to review.
        if let Some(last) = rounds.last_mut() {
            if is_review_outcome(action) {
                let outcome = ReviewOutcome {
                    decision: entry.action_type.clone(),
                    reviewer_id: entry.user_id,
                    decided_at: entry.timestamp,
                    comment: comment_of(entry),
                };
                last.outcome = Some(outcome.clone());
                last.decisions.push(outcome);
                continue;
            }
            if is_review_side(entry) {
                last.record(entry);
                continue;
            }
        }

        current.record(entry);

        if action == action_types::REPORT_SUBMIT {
            current.submitted_at = Some(entry.timestamp);
            current.submitted_by = entry.user_id;
            let next = current.round + 1;
            rounds.push(std::mem::replace(&mut current, RevisionRound::new(next)));
        }
    }

    let total_submissions = rounds.len() as u32;
    if current.entry_count > 0 {
        rounds.push(current);
    }
    for round in &mut rounds {
        round.finish();
    }

    let current_round = rounds.last().map_or(1, |r| r.round);

    RevisionHistory {
        rounds,
        total_submissions,
        current_round,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::audit::entity_types;

    struct Log {
        entries: Vec<AuditEntry>,
    }

    impl Log {
        fn new() -> Self {
            Self { entries: Vec::new() }
        }

        fn push(
            &mut self,
            user_id: DbId,
            action: &str,
            entity: (&str, DbId),
            details: Option<Value>,
        ) -> &mut Self {
            let id = self.entries.len() as DbId + 1;
            let base = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
            self.entries.push(AuditEntry {
                id,
                timestamp: base + Duration::minutes(id),
                user_id: Some(user_id),
                action_type: action.into(),
                entity_type: Some(entity.0.into()),
                entity_id: Some(entity.1),
                details,
            });
            self
        }

        fn edit(&mut self, user: DbId, field: &str, old: Value, new: Value) -> &mut Self {
            self.push(
                user,
                action_types::REPORT_UPDATE,
                (entity_types::REPORT, 1),
                Some(json!({"changes": {field: {"old": old, "new": new}}})),
            )
        }

        fn submit(&mut self, user: DbId) -> &mut Self {
            self.push(user, action_types::REPORT_SUBMIT, (entity_types::REPORT, 1), None)
        }

        fn decide(&mut self, user: DbId, action: &str, comment: Option<&str>) -> &mut Self {
            let details = comment.map(|c| json!({"comment": c}));
            self.push(user, action, (entity_types::REPORT, 1), details)
        }
    }

    #[test]
    fn empty_log_has_no_rounds() {
        let history = reconstruct(vec![]);
        assert!(history.rounds.is_empty());
        assert_eq!(history.total_submissions, 0);
        assert_eq!(history.current_round, 1);
    }

    #[test]
    fn unsubmitted_edits_form_open_round() {
        let mut log = Log::new();
        log.push(3, action_types::REPORT_CREATE, (entity_types::REPORT, 1), None)
            .edit(3, "conclusions", json!(null), json!("Sound"));
        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 1);
        assert!(history.rounds[0].is_open());
        assert_eq!(history.total_submissions, 0);
        assert_eq!(history.rounds[0].changes.len(), 1);
    }

    #[test]
    fn rounds_split_at_submissions_and_outcomes_attach() {
        let mut log = Log::new();
        log.edit(3, "executive_summary", json!(null), json!("Draft"))
            .submit(3)
            .decide(5, action_types::REPORT_REQUEST_REVISION, Some("Add flashing photos"))
            .push(3, action_types::ENTITY_CREATE, (entity_types::DEFECT, 40), None)
            .push(3, action_types::PHOTO_UPLOAD, (entity_types::PHOTO, 41), None)
            .push(3, action_types::ENTITY_DELETE, (entity_types::PHOTO, 9), None)
            .submit(3)
            .decide(5, action_types::REPORT_APPROVE, None);

        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 2);
        assert_eq!(history.total_submissions, 2);
        assert_eq!(history.current_round, 2);

        let first = &history.rounds[0];
        assert_eq!(first.entry_count, 2);
        let outcome = first.outcome.as_ref().unwrap();
        assert_eq!(outcome.decision, action_types::REPORT_REQUEST_REVISION);
        assert_eq!(outcome.reviewer_id, Some(5));
        assert_eq!(outcome.comment.as_deref(), Some("Add flashing photos"));

        let second = &history.rounds[1];
        assert_eq!(second.entry_count, 4, "decision must not count toward round 2");
        assert_eq!(second.entities_created.get("defect"), Some(&1));
        assert_eq!(second.entities_created.get("photo"), Some(&1));
        assert_eq!(second.entities_deleted.get("photo"), Some(&1));
        assert_eq!(
            second.outcome.as_ref().unwrap().decision,
            action_types::REPORT_APPROVE
        );
    }

    #[test]
    fn no_open_round_after_final_submission() {
        let mut log = Log::new();
        log.edit(3, "conclusions", json!(null), json!("x")).submit(3);
        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 1);
        assert!(!history.rounds[0].is_open());
    }

    #[test]
    fn net_changes_collapse_repeated_edits() {
        let mut log = Log::new();
        log.edit(3, "conclusions", json!("A"), json!("B"))
            .edit(3, "conclusions", json!("B"), json!("C"))
            .edit(3, "roof_age_years", json!(10), json!(12))
            .edit(3, "roof_age_years", json!(12), json!(10))
            .submit(3);
        let round = &reconstruct(log.entries).rounds[0];
        assert_eq!(round.changes.len(), 4);
        assert_eq!(round.net_changes.len(), 1);
        assert_eq!(round.net_changes[0].field, "conclusions");
        assert_eq!(round.net_changes[0].old, json!("A"));
        assert_eq!(round.net_changes[0].new, json!("C"));
    }

    #[test]
    fn net_changes_are_per_entity() {
        let mut log = Log::new();
        log.push(
            3,
            action_types::ENTITY_UPDATE,
            (entity_types::DEFECT, 7),
            Some(json!({"changes": {"severity": {"old": "minor", "new": "major"}}})),
        )
        .push(
            3,
            action_types::ENTITY_UPDATE,
            (entity_types::DEFECT, 8),
            Some(json!({"changes": {"severity": {"old": "minor", "new": "critical"}}})),
        );
        let round = &reconstruct(log.entries).rounds[0];
        assert_eq!(round.net_changes.len(), 2);
        assert_eq!(round.net_changes[0].entity_id, Some(7));
        assert_eq!(round.net_changes[1].entity_id, Some(8));
    }

    #[test]
    fn entries_are_sorted_before_grouping() {
        let mut log = Log::new();
        log.edit(3, "conclusions", json!(null), json!("x"))
            .submit(3)
            .decide(5, action_types::REPORT_APPROVE, None);
        let mut shuffled = log.entries;
        shuffled.reverse();
        let history = reconstruct(shuffled);
        assert_eq!(history.rounds.len(), 1);
        assert_eq!(history.rounds[0].changes.len(), 1);
        assert!(history.rounds[0].outcome.is_some());
    }

    #[test]
    fn reopen_after_approval_records_both_decisions() {
        let mut log = Log::new();
        log.submit(3)
            .decide(5, action_types::REPORT_APPROVE, None)
            .decide(1, action_types::REPORT_REOPEN, Some("Client supplied new evidence"));
        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 1);
        let round = &history.rounds[0];
        assert_eq!(round.decisions.len(), 2);
        assert_eq!(
            round.outcome.as_ref().unwrap().decision,
            action_types::REPORT_REOPEN
        );
    }

    #[test]
    fn reviewer_notes_during_review_stay_in_submitted_round() {
        let mut log = Log::new();
        log.edit(3, "conclusions", json!(null), json!("Sound"))
            .submit(3)
            .edit(5, "reviewer_notes", json!(null), json!("Check gutter photo"))
            .decide(5, action_types::REPORT_APPROVE, None);

        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 1);
        assert_eq!(history.current_round, 1);

        let round = &history.rounds[0];
        assert!(!round.is_open());
        assert_eq!(
            round.outcome.as_ref().unwrap().decision,
            action_types::REPORT_APPROVE
        );
        assert_eq!(round.entry_count, 3);
        assert_eq!(round.net_changes.len(), 2);
        assert_eq!(round.net_changes[1].field, "reviewer_notes");
    }

    #[test]
    fn share_after_approval_does_not_open_a_round() {
        let mut log = Log::new();
        log.submit(3)
            .decide(5, action_types::REPORT_APPROVE, None)
            .push(5, action_types::SHARE_CREATE, (entity_types::SHARE, 2), None)
            .push(0, action_types::SHARE_ACCESS, (entity_types::SHARE, 2), None)
            .push(5, action_types::PDF_GENERATE, (entity_types::REPORT, 1), None)
            .decide(1, action_types::REPORT_REOPEN, Some("Client supplied new evidence"));

        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 1);
        assert_eq!(history.current_round, 1);
        let round = &history.rounds[0];
        assert_eq!(round.decisions.len(), 2);
        assert_eq!(
            round.outcome.as_ref().unwrap().decision,
            action_types::REPORT_REOPEN
        );
        assert!(round.entities_created.is_empty());
    }

    #[test]
    fn inspector_edits_after_decision_open_next_round() {
        let mut log = Log::new();
        log.submit(3)
            .decide(5, action_types::REPORT_REQUEST_REVISION, Some("More detail"))
            .edit(5, "reviewer_notes", json!(null), json!("See comment"))
            .edit(3, "conclusions", json!("Short"), json!("Longer conclusions"))
            .push(5, action_types::PDF_GENERATE, (entity_types::REPORT, 1), None);

        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 2);
        assert_eq!(history.total_submissions, 1);
        assert_eq!(history.current_round, 2);

        assert_eq!(history.rounds[0].entry_count, 3);
        let open = &history.rounds[1];
        assert!(open.is_open());
        assert_eq!(open.entry_count, 1);
        assert_eq!(open.net_changes[0].field, "conclusions");
    }

    #[test]
    fn mixed_update_counts_as_content() {
        let mut log = Log::new();
        log.submit(3).push(
            1,
            action_types::REPORT_UPDATE,
            (entity_types::REPORT, 1),
            Some(json!({"changes": {
                "reviewer_notes": {"old": null, "new": "n"},
                "conclusions": {"old": "a", "new": "b"}
            }})),
        );
        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 2);
        assert!(history.rounds[1].is_open());
    }

    #[test]
    fn decision_without_prior_submission_is_ordinary_entry() {
        let mut log = Log::new();
        log.decide(5, action_types::REPORT_APPROVE, None);
        let history = reconstruct(log.entries);
        assert_eq!(history.rounds.len(), 1);
        assert!(history.rounds[0].is_open());
        assert!(history.rounds[0].outcome.is_none());
    }
}
