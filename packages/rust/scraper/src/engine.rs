//! Page fetching, per-department pagination, and the run orchestrator.
//!
//! The engine walks each configured department's listing pages in
//! strictly increasing index order. A transport failure skips that one
//! page and moves on — only a page that contributes zero previously
//! unseen records ends a department's traversal, so a source that
//! repeats its last page indefinitely still terminates. A hard page
//! ceiling bounds every department regardless.

use std::time::Duration;

use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use civicwatch_shared::{CivicWatchError, Result, ScrapeConfig, Tender};

use crate::dedup::{Insert, TenderSet};
use crate::extract::{extract_rows, row_to_tender};

/// Browser-like User-Agent. The municipal site drops requests with
/// obvious bot agents; this is a compatibility measure, nothing more.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ---------------------------------------------------------------------------
// Pagination state machine
// ---------------------------------------------------------------------------

/// Outcome of one page attempt within a department traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetch and extraction succeeded. `raw_rows` counts valid rows
    /// observed, `new_records` those with a previously unseen identity.
    Fetched { raw_rows: usize, new_records: usize },
    /// Transport failure (timeout, connection error, non-2xx).
    FetchFailed,
}

/// Next step after a page outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the next page index.
    Advance,
    /// The department's listing is exhausted.
    Stop,
}

/// The termination contract, kept as a pure function so it is testable
/// in isolation. A failed fetch is not evidence the listing has ended,
/// so it advances; only a successfully fetched page with zero new
/// records stops the traversal.
pub fn advance(outcome: &PageOutcome) -> Transition {
    match outcome {
        PageOutcome::FetchFailed => Transition::Advance,
        PageOutcome::Fetched { new_records: 0, .. } => Transition::Stop,
        PageOutcome::Fetched { .. } => Transition::Advance,
    }
}

// ---------------------------------------------------------------------------
// Run summaries
// ---------------------------------------------------------------------------

/// Per-department traversal record, discarded after contributing to
/// the run summary.
#[derive(Debug, Clone)]
pub struct DepartmentRun {
    /// Department code.
    pub dept: String,
    /// Outcome of every attempted page, in index order.
    pub pages: Vec<PageOutcome>,
    /// Valid rows observed across the department's pages.
    pub raw_rows: usize,
    /// Previously unseen records contributed.
    pub new_records: usize,
    /// Terminated by the zero-new-records stop signal.
    pub stopped_early: bool,
    /// Ran into the page ceiling without a stop signal.
    pub ceiling_hit: bool,
}

/// A tender id claimed by more than one department within a run.
/// Last-wins applies, but the collision is surfaced for operator
/// review since it usually signals reused sequential ids upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub id: String,
    pub first_dept: String,
    pub later_dept: String,
}

/// Summary of a completed scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    /// Total valid rows observed across all fetched pages.
    pub raw_rows: usize,
    /// Final deduplicated record count.
    pub unique: usize,
    /// Per-department traversal records.
    pub departments: Vec<DepartmentRun>,
    /// Cross-department identity collisions.
    pub collisions: Vec<Collision>,
}

// ---------------------------------------------------------------------------
// Progress observer
// ---------------------------------------------------------------------------

/// Progress callbacks for a scrape run.
pub trait ScrapeObserver: Send + Sync {
    /// Called after each page attempt.
    fn page_done(&self, dept: &str, page: u32, outcome: &PageOutcome);
    /// Called when a department traversal completes.
    fn department_done(&self, run: &DepartmentRun);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl ScrapeObserver for SilentObserver {
    fn page_done(&self, _dept: &str, _page: u32, _outcome: &PageOutcome) {}
    fn department_done(&self, _run: &DepartmentRun) {}
}

// ---------------------------------------------------------------------------
// Politeness throttle
// ---------------------------------------------------------------------------

/// Enforces the configured delay between successive fetches, across
/// department boundaries as well as within them.
struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last: None,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

/// Sequential tender scraper over the configured departments.
pub struct Scraper {
    config: ScrapeConfig,
    client: Client,
}

impl Scraper {
    /// Create a scraper with the given configuration.
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CivicWatchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Run the full ingestion pipeline: every department, every page
    /// until stop signal or ceiling.
    ///
    /// Infallible by design — transport failures are isolated per page
    /// and a department contributing nothing is a valid outcome. The
    /// returned records are deduplicated, in insertion order.
    #[instrument(skip_all)]
    pub async fn run(&self, observer: &dyn ScrapeObserver) -> (ScrapeSummary, Vec<Tender>) {
        let mut set = TenderSet::new();
        let mut throttle = Throttle::new(self.config.delay_ms);
        let mut departments = Vec::new();
        let mut collisions = Vec::new();

        info!(
            departments = ?self.config.departments,
            max_pages = self.config.max_pages,
            "starting tender scrape"
        );

        for dept in &self.config.departments {
            let run = self
                .scrape_department(dept, &mut set, &mut collisions, &mut throttle, observer)
                .await;
            info!(
                dept = %run.dept,
                pages = run.pages.len(),
                new_records = run.new_records,
                stopped_early = run.stopped_early,
                ceiling_hit = run.ceiling_hit,
                "department traversal complete"
            );
            observer.department_done(&run);
            departments.push(run);
        }

        let summary = ScrapeSummary {
            raw_rows: departments.iter().map(|d| d.raw_rows).sum(),
            unique: set.len(),
            departments,
            collisions,
        };

        info!(
            raw_rows = summary.raw_rows,
            unique = summary.unique,
            collisions = summary.collisions.len(),
            "scrape completed"
        );

        (summary, set.into_vec())
    }

    /// Drive one department across page indices 1..=max_pages.
    async fn scrape_department(
        &self,
        dept: &str,
        set: &mut TenderSet,
        collisions: &mut Vec<Collision>,
        throttle: &mut Throttle,
        observer: &dyn ScrapeObserver,
    ) -> DepartmentRun {
        let mut run = DepartmentRun {
            dept: dept.to_string(),
            pages: Vec::new(),
            raw_rows: 0,
            new_records: 0,
            stopped_early: false,
            ceiling_hit: false,
        };

        for page in 1..=self.config.max_pages {
            throttle.wait().await;

            let outcome = match self.fetch_page(dept, page).await {
                Ok(body) => {
                    let (raw_rows, new_records) =
                        absorb_rows(&body, dept, set, collisions);
                    debug!(dept, page, raw_rows, new_records, "page extracted");
                    PageOutcome::Fetched {
                        raw_rows,
                        new_records,
                    }
                }
                Err(e) => {
                    warn!(dept, page, error = %e, "page fetch failed, skipping");
                    PageOutcome::FetchFailed
                }
            };

            if let PageOutcome::Fetched {
                raw_rows,
                new_records,
            } = outcome
            {
                run.raw_rows += raw_rows;
                run.new_records += new_records;
            }

            observer.page_done(dept, page, &outcome);
            let next = advance(&outcome);
            run.pages.push(outcome);

            if next == Transition::Stop {
                run.stopped_early = true;
                break;
            }
        }

        run.ceiling_hit =
            !run.stopped_early && run.pages.len() as u32 == self.config.max_pages;
        run
    }

    /// Fetch one listing page. Never panics past this boundary; every
    /// failure mode comes back as a classified [`CivicWatchError::Network`].
    async fn fetch_page(&self, dept: &str, page: u32) -> Result<String> {
        let url = page_url(&self.config.base_url, dept, page)?;
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| CivicWatchError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CivicWatchError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| CivicWatchError::Network(format!("{url}: body read failed: {e}")))
    }
}

/// Run extraction over a page body and feed valid rows into the set.
/// Returns `(raw_rows, new_records)` for the page.
fn absorb_rows(
    body: &str,
    dept: &str,
    set: &mut TenderSet,
    collisions: &mut Vec<Collision>,
) -> (usize, usize) {
    let mut raw_rows = 0;
    let mut new_records = 0;

    for row in extract_rows(body) {
        let Some(tender) = row_to_tender(&row) else {
            // Missing identity or title: a non-contribution, not an error
            continue;
        };
        raw_rows += 1;

        match set.insert(tender, dept) {
            Insert::New => new_records += 1,
            Insert::Superseded { prior_dept } => {
                if prior_dept != dept {
                    warn!(
                        id = %row.id,
                        first_dept = %prior_dept,
                        later_dept = %dept,
                        "cross-department tender id collision, keeping later record"
                    );
                    collisions.push(Collision {
                        id: row.id,
                        first_dept: prior_dept,
                        later_dept: dept.to_string(),
                    });
                }
            }
        }
    }

    (raw_rows, new_records)
}

/// Build the listing URL for a department page by appending `id` and
/// `page` query parameters to the configured base URL.
fn page_url(base: &str, dept: &str, page: u32) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| CivicWatchError::config(format!("invalid base_url '{base}': {e}")))?;
    url.query_pairs_mut()
        .append_pair("id", dept)
        .append_pair("page", &page.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn table(rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(id, title)| format!("<tr><td>{id}</td><td>{title}</td><td>01-02-2026</td></tr>"))
            .collect();
        format!("<html><body><table><tr><th>ID</th><th>Work</th><th>Date</th></tr>{body}</table></body></html>")
    }

    fn config(server: &MockServer, departments: &[&str], max_pages: u32) -> ScrapeConfig {
        ScrapeConfig {
            departments: departments.iter().map(|d| d.to_string()).collect(),
            base_url: format!("{}/tenders.php", server.uri()),
            max_pages,
            timeout_secs: 5,
            delay_ms: 0,
        }
    }

    async fn mount_page(server: &MockServer, dept: &str, page: u32, body: String) {
        Mock::given(method("GET"))
            .and(path("/tenders.php"))
            .and(query_param("id", dept))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    // -----------------------------------------------------------------------
    // Transition function
    // -----------------------------------------------------------------------

    #[test]
    fn fetch_failure_advances_instead_of_stopping() {
        assert_eq!(advance(&PageOutcome::FetchFailed), Transition::Advance);
    }

    #[test]
    fn zero_new_records_stops() {
        assert_eq!(
            advance(&PageOutcome::Fetched {
                raw_rows: 5,
                new_records: 0
            }),
            Transition::Stop
        );
    }

    #[test]
    fn new_records_advance() {
        assert_eq!(
            advance(&PageOutcome::Fetched {
                raw_rows: 3,
                new_records: 1
            }),
            Transition::Advance
        );
    }

    #[test]
    fn page_url_appends_department_and_page() {
        let url = page_url(
            "https://www.nwcmc.gov.in/web/tenders.php?uid=NDA4",
            "ENG",
            2,
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.nwcmc.gov.in/web/tenders.php?uid=NDA4&id=ENG&page=2"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = page_url("not a url", "ENG", 1).unwrap_err();
        assert!(err.to_string().contains("config error"));
    }

    // -----------------------------------------------------------------------
    // Pipeline tests against a mock server
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn stops_after_duplicate_only_page_without_fetching_further() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "ENG",
            1,
            table(&[("1", "A"), ("2", "B"), ("3", "C")]),
        )
        .await;
        // Page 2 repeats page 1: non-empty but contributes nothing new
        mount_page(
            &server,
            "ENG",
            2,
            table(&[("1", "A"), ("2", "B"), ("3", "C")]),
        )
        .await;
        // Page 3 must never be requested
        Mock::given(method("GET"))
            .and(path("/tenders.php"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(table(&[("4", "D")])))
            .expect(0)
            .mount(&server)
            .await;

        let scraper = Scraper::new(config(&server, &["ENG"], 5)).unwrap();
        let (summary, tenders) = scraper.run(&SilentObserver).await;

        assert_eq!(tenders.len(), 3);
        let run = &summary.departments[0];
        assert_eq!(run.pages.len(), 2);
        assert!(run.stopped_early);
        assert!(!run.ceiling_hit);
        server.verify().await;
    }

    #[tokio::test]
    async fn failed_page_does_not_abandon_the_department() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tenders.php"))
            .and(query_param("id", "ENG"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "ENG", 2, table(&[("10", "Culvert"), ("11", "Drain")])).await;
        mount_page(&server, "ENG", 3, table(&[])).await;

        let scraper = Scraper::new(config(&server, &["ENG"], 5)).unwrap();
        let (summary, tenders) = scraper.run(&SilentObserver).await;

        assert_eq!(tenders.len(), 2);
        let run = &summary.departments[0];
        assert_eq!(run.pages[0], PageOutcome::FetchFailed);
        assert_eq!(
            run.pages[1],
            PageOutcome::Fetched {
                raw_rows: 2,
                new_records: 2
            }
        );
        assert!(run.stopped_early);
    }

    #[tokio::test]
    async fn ceiling_bounds_a_department_that_never_stops() {
        let server = MockServer::start().await;

        // Every page yields fresh identities; only the ceiling can stop it
        for page in 1..=3 {
            mount_page(
                &server,
                "ENG",
                page,
                table(&[(&*format!("{page}00"), "Work")]),
            )
            .await;
        }
        Mock::given(method("GET"))
            .and(path("/tenders.php"))
            .and(query_param("page", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_string(table(&[("999", "X")])))
            .expect(0)
            .mount(&server)
            .await;

        let scraper = Scraper::new(config(&server, &["ENG"], 3)).unwrap();
        let (summary, tenders) = scraper.run(&SilentObserver).await;

        assert_eq!(tenders.len(), 3);
        let run = &summary.departments[0];
        assert_eq!(run.pages.len(), 3);
        assert!(!run.stopped_early);
        assert!(run.ceiling_hit);
        server.verify().await;
    }

    #[tokio::test]
    async fn totally_failing_department_contributes_nothing_but_run_continues() {
        let server = MockServer::start().await;

        // Every ENG page times out at the HTTP level (connection refused is
        // equivalent for classification); use 503s for determinism.
        Mock::given(method("GET"))
            .and(path("/tenders.php"))
            .and(query_param("id", "ENG"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount_page(&server, "WS", 1, table(&[("50", "Pipeline")])).await;
        mount_page(&server, "WS", 2, table(&[])).await;

        let scraper = Scraper::new(config(&server, &["ENG", "WS"], 2)).unwrap();
        let (summary, tenders) = scraper.run(&SilentObserver).await;

        assert_eq!(tenders.len(), 1);
        assert_eq!(tenders[0].id, "50");
        let eng = &summary.departments[0];
        assert_eq!(eng.pages, vec![PageOutcome::FetchFailed, PageOutcome::FetchFailed]);
        assert!(eng.ceiling_hit);
        assert_eq!(eng.new_records, 0);
    }

    #[tokio::test]
    async fn cross_department_merge_is_last_wins_and_flagged() {
        let server = MockServer::start().await;

        // Department A: one record, then an exhausted page
        mount_page(&server, "A", 1, table(&[("1", "X")])).await;
        mount_page(&server, "A", 2, table(&[])).await;
        // Department B: re-claims id 1 with a different title, plus a new id
        mount_page(&server, "B", 1, table(&[("1", "Y"), ("2", "Z")])).await;
        mount_page(&server, "B", 2, table(&[])).await;

        let scraper = Scraper::new(config(&server, &["A", "B"], 3)).unwrap();
        let (summary, tenders) = scraper.run(&SilentObserver).await;

        assert_eq!(summary.raw_rows, 3);
        assert_eq!(summary.unique, 2);
        assert_eq!(tenders.len(), 2);
        assert_eq!(tenders[0].id, "1");
        assert_eq!(tenders[0].title, "Y");
        assert_eq!(tenders[1].id, "2");
        assert_eq!(tenders[1].title, "Z");

        assert_eq!(
            summary.collisions,
            vec![Collision {
                id: "1".into(),
                first_dept: "A".into(),
                later_dept: "B".into(),
            }]
        );
    }

    #[tokio::test]
    async fn header_and_short_rows_never_reach_the_collection() {
        let server = MockServer::start().await;

        let body = "<html><body><table>\
            <tr><th>ID</th><th>Work</th></tr>\
            <tr><td>lonely cell</td></tr>\
            <tr><td>7</td><td>Street Lighting</td><td>05-01-2026</td></tr>\
            </table></body></html>";
        mount_page(&server, "ENG", 1, body.to_string()).await;
        mount_page(&server, "ENG", 2, table(&[])).await;

        let scraper = Scraper::new(config(&server, &["ENG"], 3)).unwrap();
        let (summary, tenders) = scraper.run(&SilentObserver).await;

        assert_eq!(summary.raw_rows, 1);
        assert_eq!(tenders.len(), 1);
        assert_eq!(tenders[0].id, "7");
    }
}
