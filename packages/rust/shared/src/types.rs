//! Core domain types for CivicWatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel closing date used when the source row does not expose a
/// machine-extractable closing date.
pub const CLOSING_DATE_FALLBACK: &str = "Check Document";

// ---------------------------------------------------------------------------
// Tender
// ---------------------------------------------------------------------------

/// A single tender record as persisted in the snapshot file.
///
/// `id` is the source-assigned tender identifier and the dedup key for
/// a run; it is not guaranteed stable across site redesigns. Dates are
/// kept verbatim — the source format is inconsistent and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    /// Source-assigned tender identifier.
    pub id: String,
    /// Free-text work description; may contain Marathi script.
    pub title: String,
    /// Source-formatted publish date, preserved verbatim.
    pub publish_date: String,
    /// Closing date, or [`CLOSING_DATE_FALLBACK`] when absent.
    #[serde(default = "closing_date_fallback")]
    pub closing_date: String,
}

fn closing_date_fallback() -> String {
    CLOSING_DATE_FALLBACK.into()
}

// ---------------------------------------------------------------------------
// CitizenReport
// ---------------------------------------------------------------------------

/// A citizen photo report attached to a tender/project, stored in
/// `reports.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenReport {
    /// Report identifier (`rep_<uuid>`).
    pub id: String,
    /// The tender/project this report is about.
    #[serde(rename = "projectId")]
    pub project_id: String,
    /// URL of the submitted photo.
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
    /// Submission time.
    pub timestamp: DateTime<Utc>,
    /// Review status; new reports start as `pending_review`.
    pub status: String,
}

// ---------------------------------------------------------------------------
// WardEntry
// ---------------------------------------------------------------------------

/// One entry of the static ward directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardEntry {
    /// Ward number.
    pub ward_no: u32,
    /// Localities covered by the ward.
    #[serde(default)]
    pub areas: Vec<String>,
    /// Elected corporator for the ward.
    pub nagarsevak_name: String,
    /// Political party.
    #[serde(default)]
    pub party: String,
    /// Contact number.
    #[serde(default)]
    pub mobile: String,
}
