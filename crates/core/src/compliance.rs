//! Compliance checklist catalogue and assessment validation.
//!
//! Checklists are fixed regulatory item lists. An assessment stores one
//! result per item code as a JSON object:
//!
//! ```json
//! { "e2_flashings": { "result": "pass" }, "e2_cladding": { "result": "fail", "notes": "…" } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Checklist catalogue
// ---------------------------------------------------------------------------

pub const CHECKLIST_E2_AS1: &str = "e2_as1";
pub const CHECKLIST_METAL_ROOF_COP: &str = "metal_roof_cop";
pub const CHECKLIST_B2_DURABILITY: &str = "b2_durability";

/// A checklist definition: code, title and its fixed items.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistDefinition {
    pub code: &'static str,
    pub title: &'static str,
    pub items: &'static [ChecklistItemDefinition],
}

/// A single checklist item.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItemDefinition {
    pub code: &'static str,
    pub description: &'static str,
}

const fn item(code: &'static str, description: &'static str) -> ChecklistItemDefinition {
    ChecklistItemDefinition { code, description }
}

const E2_AS1_ITEMS: &[ChecklistItemDefinition] = &[
    item("e2_roof_pitch", "Roof pitch suits the cladding profile and underlay"),
    item("e2_flashings", "Flashings installed with required cover and upstands"),
    item("e2_penetrations", "Penetrations sealed and flashed to manufacturer detail"),
    item("e2_underlay", "Roof underlay present, lapped and supported"),
    item("e2_gutters", "Gutters and downpipes sized and falling to outlets"),
    item("e2_junctions", "Roof/wall junctions and apron flashings weathertight"),
];

const METAL_ROOF_COP_ITEMS: &[ChecklistItemDefinition] = &[
    item("cop_fixings", "Fastener type, spacing and washers per code of practice"),
    item("cop_end_laps", "End laps and side laps sealed and oriented correctly"),
    item("cop_turn_ups", "Sheet ends turned up/down at ridges and gutters"),
    item("cop_dissimilar_metals", "No contact between incompatible metals"),
    item("cop_swarf", "Swarf and offcuts removed from roof surface"),
    item("cop_expansion", "Thermal expansion provision for long runs"),
];

const B2_DURABILITY_ITEMS: &[ChecklistItemDefinition] = &[
    item("b2_cladding_life", "Roof cladding meets 15-year durability requirement"),
    item("b2_flashing_life", "Flashings meet 15-year durability requirement"),
    item("b2_fixings_life", "Fixings meet 50-year requirement where not replaceable"),
    item("b2_maintenance", "Maintenance requirements documented and followed"),
    item("b2_corrosion_zone", "Materials suit the site corrosion zone"),
];

/// All checklists known to the system.
pub const CHECKLISTS: &[ChecklistDefinition] = &[
    ChecklistDefinition {
        code: CHECKLIST_E2_AS1,
        title: "E2/AS1 External Moisture",
        items: E2_AS1_ITEMS,
    },
    ChecklistDefinition {
        code: CHECKLIST_METAL_ROOF_COP,
        title: "Metal Roof and Wall Cladding Code of Practice",
        items: METAL_ROOF_COP_ITEMS,
    },
    ChecklistDefinition {
        code: CHECKLIST_B2_DURABILITY,
        title: "B2 Durability",
        items: B2_DURABILITY_ITEMS,
    },
];

/// Look up a checklist by code.
pub fn find_checklist(code: &str) -> Option<&'static ChecklistDefinition> {
    CHECKLISTS.iter().find(|c| c.code == code)
}

// ---------------------------------------------------------------------------
// Item results
// ---------------------------------------------------------------------------

/// Outcome recorded against a checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemResult {
    Pass,
    Fail,
    Na,
}

/// The recorded answer for one checklist item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAssessment {
    pub result: ItemResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Checklist answers keyed by item code.
pub type ChecklistItems = BTreeMap<String, ItemAssessment>;

/// Maximum length for an item note.
pub const MAX_ITEM_NOTES_LENGTH: usize = 2_000;

/// Parse and validate an `items` JSON object against its checklist.
///
/// Unknown checklist codes, unknown item codes and malformed results are
/// rejected. Missing items are allowed (the assessment may be partial).
pub fn validate_items(
    checklist_code: &str,
    items: &serde_json::Value,
) -> Result<ChecklistItems, CoreError> {
    let checklist = find_checklist(checklist_code).ok_or_else(|| {
        CoreError::Validation(format!("Unknown compliance checklist '{checklist_code}'"))
    })?;

    let parsed: ChecklistItems = serde_json::from_value(items.clone()).map_err(|e| {
        CoreError::Validation(format!("Invalid checklist items payload: {e}"))
    })?;

    for (code, assessment) in &parsed {
        if !checklist.items.iter().any(|i| i.code == code) {
            return Err(CoreError::Validation(format!(
                "Item '{code}' does not belong to checklist '{checklist_code}'"
            )));
        }
        if assessment
            .notes
            .as_ref()
            .is_some_and(|n| n.len() > MAX_ITEM_NOTES_LENGTH)
        {
            return Err(CoreError::Validation(format!(
                "Notes for item '{code}' exceed {MAX_ITEM_NOTES_LENGTH} characters"
            )));
        }
    }

    Ok(parsed)
}

/// Progress of a single assessment against its checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub checklist_code: String,
    pub answered: usize,
    pub total: usize,
    pub failed: usize,
    /// Failed items that carry no explanatory notes.
    pub failed_without_notes: Vec<String>,
    /// Item codes that have no recorded result.
    pub unanswered: Vec<String>,
}

impl ChecklistProgress {
    pub fn is_complete(&self) -> bool {
        self.unanswered.is_empty()
    }
}

/// Compute progress for an assessment. Unknown checklist codes count as
/// empty (zero items).
pub fn checklist_progress(checklist_code: &str, items: &ChecklistItems) -> ChecklistProgress {
    let definition_items = find_checklist(checklist_code)
        .map(|c| c.items)
        .unwrap_or(&[]);

    let mut unanswered = Vec::new();
    let mut failed = 0;
    let mut failed_without_notes = Vec::new();

    for def in definition_items {
        match items.get(def.code) {
            None => unanswered.push(def.code.to_string()),
            Some(a) if a.result == ItemResult::Fail => {
                failed += 1;
                if a.notes.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    failed_without_notes.push(def.code.to_string());
                }
            }
            Some(_) => {}
        }
    }

    ChecklistProgress {
        checklist_code: checklist_code.to_string(),
        answered: definition_items.len() - unanswered.len(),
        total: definition_items.len(),
        failed,
        failed_without_notes,
        unanswered,
    }
}
