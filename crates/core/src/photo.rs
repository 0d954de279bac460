//! Photo evidentiary metadata: content types, GPS and capture-time checks,
//! storage keys, and chain-of-custody state.
//!
//! The server always computes its own SHA-256 of the uploaded bytes. When
//! the capturing device supplied a hash, the two are compared and the
//! outcome is recorded as the photo's custody state.

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::hashing;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// Accepted upload content types with their canonical file extension.
pub const ACCEPTED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/heic", "heic"),
];

/// Default maximum upload size: 25 MiB.
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 25 * 1024 * 1024;

/// Allowed clock skew between the capturing device and the server.
pub const CAPTURE_CLOCK_SKEW_MINUTES: i64 = 5;

/// Photos captured more than this many days before the inspection date are
/// flagged as possibly stale evidence.
pub const STALE_CAPTURE_DAYS: i64 = 30;

/// Maximum caption length.
pub const MAX_CAPTION_LENGTH: usize = 1_000;

/// Resolve the file extension for an accepted content type.
pub fn extension_for_content_type(content_type: &str) -> Result<&'static str, CoreError> {
    let normalized = content_type.trim().to_ascii_lowercase();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == normalized)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unsupported photo content type '{content_type}'. Accepted: {}",
                ACCEPTED_CONTENT_TYPES
                    .iter()
                    .map(|(ct, _)| *ct)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
}

/// Validate the upload size against the configured limit.
pub fn validate_size(size_bytes: usize, max_bytes: usize) -> Result<(), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation("Photo upload is empty".into()));
    }
    if size_bytes > max_bytes {
        return Err(CoreError::Validation(format!(
            "Photo exceeds the maximum upload size of {max_bytes} bytes"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GPS and capture time
// ---------------------------------------------------------------------------

/// Validate GPS coordinates. Latitude and longitude must be supplied together.
pub fn validate_gps(
    latitude: Option<f64>,
    longitude: Option<f64>,
    accuracy_m: Option<f64>,
) -> Result<(), CoreError> {
    match (latitude, longitude) {
        (None, None) => {}
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(CoreError::Validation(format!(
                    "GPS latitude {lat} is outside -90..90"
                )));
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(CoreError::Validation(format!(
                    "GPS longitude {lng} is outside -180..180"
                )));
            }
        }
        _ => {
            return Err(CoreError::Validation(
                "GPS latitude and longitude must be supplied together".into(),
            ))
        }
    }

    if accuracy_m.is_some_and(|a| !(a >= 0.0)) {
        return Err(CoreError::Validation(
            "GPS accuracy must be a non-negative number of metres".into(),
        ));
    }
    Ok(())
}

/// Reject capture times in the future (beyond the allowed clock skew).
pub fn validate_capture_time(
    captured_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if let Some(at) = captured_at {
        if at > now + Duration::minutes(CAPTURE_CLOCK_SKEW_MINUTES) {
            return Err(CoreError::Validation(
                "Photo capture time cannot be in the future".into(),
            ));
        }
    }
    Ok(())
}

pub fn validate_caption(caption: Option<&str>) -> Result<(), CoreError> {
    if caption.is_some_and(|c| c.len() > MAX_CAPTION_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Caption must be at most {MAX_CAPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Object-storage key for a photo. Content-addressed so a re-upload of the
/// same bytes lands on the same key.
pub fn build_storage_key(report_id: DbId, sha256: &str, extension: &str) -> String {
    format!("reports/{report_id}/photos/{sha256}.{extension}")
}

// ---------------------------------------------------------------------------
// Chain of custody
// ---------------------------------------------------------------------------

/// Outcome of comparing the device-supplied hash with the server hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyState {
    /// Device hash matches the bytes received.
    Verified,
    /// Device hash was supplied but does not match.
    Mismatch,
    /// No device hash was supplied.
    Unverified,
}

/// Compare the optional client hash with the server-computed digest.
pub fn verify_client_hash(client_hash: Option<&str>, server_hash: &str) -> CustodyState {
    match client_hash {
        Some(h) if !h.trim().is_empty() => {
            if hashing::digests_match(h, server_hash) {
                CustodyState::Verified
            } else {
                CustodyState::Mismatch
            }
        }
        _ => CustodyState::Unverified,
    }
}

/// Classify a stored photo's custody state from its persisted columns.
pub fn custody_state(client_hash: Option<&str>, hash_verified: bool) -> CustodyState {
    match (client_hash, hash_verified) {
        (_, true) => CustodyState::Verified,
        (Some(h), false) if !h.trim().is_empty() => CustodyState::Mismatch,
        _ => CustodyState::Unverified,
    }
}

/// Camera make and model joined for display, if either is known.
pub fn describe_device(make: Option<&str>, model: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [make, model]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// A recorded handling of the photo (upload, metadata edit, deletion).
#[derive(Debug, Clone, Serialize)]
pub struct CustodyEvent {
    pub action: String,
    pub user_id: Option<DbId>,
    pub at: Timestamp,
}

/// Chain-of-custody summary for a single photo.
#[derive(Debug, Clone, Serialize)]
pub struct CustodyRecord {
    pub photo_id: DbId,
    pub report_id: DbId,
    pub sha256_hash: String,
    pub client_hash: Option<String>,
    pub state: CustodyState,
    pub uploaded_by: Option<DbId>,
    pub uploaded_at: Timestamp,
    pub captured_at: Option<Timestamp>,
    pub device: Option<String>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    pub events: Vec<CustodyEvent>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn device_description() {
        assert_eq!(
            describe_device(Some("Apple"), Some("iPhone 15")).as_deref(),
            Some("Apple iPhone 15")
        );
        assert_eq!(describe_device(None, Some("DJI Mini")).as_deref(), Some("DJI Mini"));
        assert_eq!(describe_device(Some(" "), None), None);
    }

    #[test]
    fn content_type_resolves_extension() {
        assert_eq!(extension_for_content_type("image/jpeg").unwrap(), "jpg");
        assert_eq!(extension_for_content_type("IMAGE/PNG").unwrap(), "png");
        assert!(extension_for_content_type("application/pdf").is_err());
    }

    #[test]
    fn size_limits() {
        assert!(validate_size(0, 10).is_err());
        assert!(validate_size(10, 10).is_ok());
        assert!(validate_size(11, 10).is_err());
    }

    #[test]
    fn gps_requires_both_coordinates() {
        assert!(validate_gps(None, None, None).is_ok());
        assert!(validate_gps(Some(-36.85), Some(174.76), Some(4.0)).is_ok());
        assert!(validate_gps(Some(-36.85), None, None).is_err());
        assert!(validate_gps(None, Some(174.76), None).is_err());
    }

    #[test]
    fn gps_ranges_enforced() {
        assert!(validate_gps(Some(91.0), Some(0.0), None).is_err());
        assert!(validate_gps(Some(0.0), Some(-181.0), None).is_err());
        assert!(validate_gps(Some(0.0), Some(0.0), Some(-1.0)).is_err());
        assert!(validate_gps(Some(0.0), Some(0.0), Some(f64::NAN)).is_err());
    }

    #[test]
    fn capture_time_in_future_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert!(validate_capture_time(Some(now - Duration::hours(1)), now).is_ok());
        assert!(validate_capture_time(Some(now + Duration::minutes(2)), now).is_ok());
        assert!(validate_capture_time(Some(now + Duration::hours(1)), now).is_err());
        assert!(validate_capture_time(None, now).is_ok());
    }

    #[test]
    fn storage_key_is_content_addressed() {
        assert_eq!(
            build_storage_key(12, "abc123", "jpg"),
            "reports/12/photos/abc123.jpg"
        );
    }

    #[test]
    fn client_hash_verification() {
        let server = hashing::sha256_hex(b"photo-bytes");
        assert_eq!(
            verify_client_hash(Some(&server.to_uppercase()), &server),
            CustodyState::Verified
        );
        assert_eq!(
            verify_client_hash(Some("0000"), &server),
            CustodyState::Mismatch
        );
        assert_eq!(verify_client_hash(None, &server), CustodyState::Unverified);
        assert_eq!(verify_client_hash(Some(" "), &server), CustodyState::Unverified);
    }

    #[test]
    fn stored_custody_state() {
        assert_eq!(custody_state(Some("abc"), true), CustodyState::Verified);
        assert_eq!(custody_state(Some("abc"), false), CustodyState::Mismatch);
        assert_eq!(custody_state(None, false), CustodyState::Unverified);
    }
}
