//! Civic display helpers: delay-status math and Indian currency formatting.

use chrono::{Months, NaiveDate};

use crate::error::{CivicWatchError, Result};

/// Delay status of a sanctioned project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStatus {
    pub is_delayed: bool,
    pub status_label: &'static str,
}

const LABEL_DELAYED: &str = "⚠️ DELAYED";
const LABEL_ON_TRACK: &str = "✅ ON TRACK";

/// Decide whether a project is delayed as of `reference`.
///
/// A project is delayed when `reference` is past the sanction date plus
/// the sanctioned duration and completion is below 100 %.
/// `sanction_date` is an ISO date string (`YYYY-MM-DD`).
pub fn project_status(
    sanction_date: &str,
    duration_months: u32,
    completion_pct: u8,
    reference: NaiveDate,
) -> Result<ProjectStatus> {
    let sanctioned = NaiveDate::parse_from_str(sanction_date, "%Y-%m-%d")
        .map_err(|e| CivicWatchError::validation(format!("bad sanction date '{sanction_date}': {e}")))?;

    let expected_completion = sanctioned
        .checked_add_months(Months::new(duration_months))
        .ok_or_else(|| CivicWatchError::validation("completion date out of range"))?;

    if reference > expected_completion && completion_pct < 100 {
        Ok(ProjectStatus {
            is_delayed: true,
            status_label: LABEL_DELAYED,
        })
    } else {
        Ok(ProjectStatus {
            is_delayed: false,
            status_label: LABEL_ON_TRACK,
        })
    }
}

/// Format an INR amount the way it is read locally: crores above 1 Cr,
/// lakhs above 1 lakh, otherwise rupees with Indian digit grouping.
pub fn format_inr(amount: u64) -> String {
    const CRORE: u64 = 10_000_000;
    const LAKH: u64 = 100_000;

    if amount >= CRORE {
        format!("₹{:.2} Cr", amount as f64 / CRORE as f64)
    } else if amount >= LAKH {
        format!("₹{:.2} Lakhs", amount as f64 / LAKH as f64)
    } else {
        format!("₹{}", group_indian(amount))
    }
}

/// Indian digit grouping: the last three digits, then groups of two
/// (e.g. `1234567` → `12,34,567`).
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<String> = Vec::new();
    let head_bytes = head.as_bytes();
    let mut i = head_bytes.len();
    while i > 0 {
        let start = i.saturating_sub(2);
        groups.push(head[start..i].to_string());
        i = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
