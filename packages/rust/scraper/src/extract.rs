//! Positional table-row extraction.
//!
//! The municipal listing pages expose tenders as plain `<table>` rows
//! with no class names or ids worth trusting, so extraction is purely
//! syntactic: every `<tr>` in the document is a candidate, columns are
//! mapped by position, and all semantic filtering happens downstream.
//! A malformed or empty document yields an empty vector, never an error.

use scraper::{ElementRef, Html, Selector};

use civicwatch_shared::{CLOSING_DATE_FALLBACK, Tender};

/// One table row as found on the page: candidate identity, title, and
/// publish date, trimmed but otherwise uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub id: String,
    pub title: String,
    pub date: String,
}

/// Extract candidate rows from a listing document, in document order.
///
/// A row is skipped when it carries header-cell markup (`<th>`) or has
/// fewer than two data cells. The document may contain several
/// unrelated tables; all of them are scanned and non-tender rows are
/// left for [`row_to_tender`] to discard.
pub fn extract_rows(html: &str) -> Vec<RawRow> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse("table tr").expect("static selector");
    let th_sel = Selector::parse("th").expect("static selector");
    let td_sel = Selector::parse("td").expect("static selector");

    let mut rows = Vec::new();
    for row in doc.select(&row_sel) {
        // Header rows carry <th> cells
        if row.select(&th_sel).next().is_some() {
            continue;
        }

        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        if cells.len() < 2 {
            continue;
        }

        rows.push(RawRow {
            id: cell_text(&cells[0]),
            title: cell_text(&cells[1]),
            date: cells.get(2).map(cell_text).unwrap_or_default(),
        });
    }
    rows
}

/// The single position-to-field mapping: cell 0 is the identity,
/// cell 1 the title, cell 2 the publish date. A site layout change is
/// absorbed here without touching pagination or dedup.
///
/// Returns `None` for rows missing an identity or title; such rows are
/// discarded, never persisted. The source never exposes a closing date
/// in the row, so it defaults to the sentinel.
pub fn row_to_tender(row: &RawRow) -> Option<Tender> {
    if row.id.is_empty() || row.title.is_empty() {
        return None;
    }

    Some(Tender {
        id: row.id.clone(),
        title: row.title.clone(),
        publish_date: row.date.clone(),
        closing_date: CLOSING_DATE_FALLBACK.into(),
    })
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
