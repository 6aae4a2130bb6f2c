//! Citizen photo-report store: an append-only JSON array.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use civicwatch_shared::{CitizenReport, CivicWatchError, Result};

use crate::snapshot::write_json_atomic;

/// Append a new report for `project_id` and return it.
///
/// Both fields must be non-empty. An unparseable report file is reset
/// to an empty list rather than blocking submissions.
pub fn append_report(path: &Path, project_id: &str, photo_url: &str) -> Result<CitizenReport> {
    if project_id.is_empty() || photo_url.is_empty() {
        return Err(CivicWatchError::validation(
            "projectId and photoUrl must both be provided",
        ));
    }

    let mut reports = read_reports(path)?;

    let report = CitizenReport {
        id: format!("rep_{}", Uuid::now_v7()),
        project_id: project_id.to_string(),
        photo_url: photo_url.to_string(),
        timestamp: Utc::now(),
        status: "pending_review".into(),
    };
    reports.push(report.clone());

    write_json_atomic(path, &reports)?;
    tracing::info!(project_id, report_id = %report.id, "report saved");
    Ok(report)
}

/// Count reports per project id. A missing file is an empty map.
pub fn report_counts(path: &Path) -> Result<HashMap<String, usize>> {
    let mut counts = HashMap::new();
    for report in read_reports(path)? {
        *counts.entry(report.project_id).or_insert(0) += 1;
    }
    Ok(counts)
}

fn read_reports(path: &Path) -> Result<Vec<CitizenReport>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| CivicWatchError::io(path, e))?;
    match serde_json::from_str(&content) {
        Ok(reports) => Ok(reports),
        Err(e) => {
            tracing::warn!(?path, error = %e, "report file unparseable, resetting to empty");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("civicwatch-reports-{tag}-{nanos}/reports.json"))
    }

    #[test]
    fn appends_and_counts_per_project() {
        let path = temp_path("count");

        append_report(&path, "17323", "https://example.com/a.jpg").unwrap();
        append_report(&path, "17323", "https://example.com/b.jpg").unwrap();
        append_report(&path, "17506", "https://example.com/c.jpg").unwrap();

        let counts = report_counts(&path).unwrap();
        assert_eq!(counts.get("17323"), Some(&2));
        assert_eq!(counts.get("17506"), Some(&1));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn new_reports_start_pending_review() {
        let path = temp_path("status");
        let report = append_report(&path, "1", "https://example.com/x.jpg").unwrap();
        assert!(report.id.starts_with("rep_"));
        assert_eq!(report.status, "pending_review");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn empty_fields_are_rejected() {
        let path = temp_path("reject");
        assert!(append_report(&path, "", "https://example.com/x.jpg").is_err());
        assert!(append_report(&path, "1", "").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_counts_as_empty() {
        let counts = report_counts(&temp_path("absent")).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn corrupt_file_resets_instead_of_blocking() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "][ not json").unwrap();

        let report = append_report(&path, "5", "https://example.com/p.jpg").unwrap();
        let counts = report_counts(&path).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("5"), Some(&1));
        assert_eq!(report.project_id, "5");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
