//! File-backed stores for CivicWatch.
//!
//! The snapshot file is the only durable representation of a scrape
//! run and is replaced atomically — a failed write never corrupts the
//! previous snapshot. Citizen reports and the ward directory are the
//! simple read/append collaborators around the dashboard.

pub mod reports;
pub mod snapshot;
pub mod wards;

pub use reports::{append_report, report_counts};
pub use snapshot::{load_snapshot, write_snapshot};
pub use wards::{find_ward, load_wards};
