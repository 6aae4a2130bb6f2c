//! Static ward-directory lookup.

use std::path::Path;

use civicwatch_shared::{CivicWatchError, Result, WardEntry};

/// Load the ward directory from a JSON array. Entries without a ward
/// number (placeholder rows in the source file) are dropped.
pub fn load_wards(path: &Path) -> Result<Vec<WardEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| CivicWatchError::io(path, e))?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(&content).map_err(|e| {
        CivicWatchError::Store(format!("bad ward directory at {}: {e}", path.display()))
    })?;

    Ok(raw
        .into_iter()
        .filter(|item| item.get("ward_no").is_some_and(|v| v.is_u64()))
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Look up a ward by number.
pub fn find_ward(wards: &[WardEntry], ward_no: u32) -> Option<&WardEntry> {
    wards.iter().find(|w| w.ward_no == ward_no)
}
