//! Tender listing ingestion pipeline.
//!
//! This crate provides:
//! - [`extract`] — positional HTML table-row extraction
//! - [`dedup`] — the identity-keyed, insertion-ordered [`TenderSet`]
//! - [`engine`] — page fetching, per-department pagination, and the
//!   run orchestrator
//!
//! The pipeline is deliberately single-sequence: one department at a
//! time, one page at a time, with a politeness delay between fetches.

pub mod dedup;
pub mod engine;
pub mod extract;

pub use dedup::{Insert, TenderSet};
pub use engine::{
    Collision, DepartmentRun, PageOutcome, ScrapeObserver, ScrapeSummary, Scraper, SilentObserver,
    Transition, advance,
};
pub use extract::{RawRow, extract_rows, row_to_tender};
