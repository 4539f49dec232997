//! # Ranking Import Reconciler
//!
//! Replaces a round's rankings with the contents of an uploaded spreadsheet.
//!
//! 1.  **Validate**: a target round is required before anything else happens.
//! 2.  **Decode** (`decode`): first sheet only; row 1 gives the significant headers,
//!     later rows become header-keyed `SheetRow`s.
//! 3.  **Resolve** (`fields`): rank, driver identity and points are read through the
//!     header synonym table, with `999` / `0` / `Unknown_<token>` fallbacks.
//! 4.  **Deduplicate** (`dedupe`): colliding identities get `_1`, `_2`, ... suffixes.
//! 5.  **Persist** (`schema`): one schema descriptor plus one record per row replace
//!     everything stored for the round through `RankingStore::replace_rankings`.

mod decode;
mod dedupe;
mod error;
mod fields;
mod schema;

pub use decode::{decode_workbook, PREVIEW_ROWS};
pub use error::ImportError;
pub use fields::HeaderSynonyms;
pub use schema::build_table;

use crate::db::{now_timestamp, RankingStore};
use common::model::import::ImportSummary;
use dedupe::{deduplicate, ResolvedRow};
use log::{error, info};
use schema::build_batch;

/// Runs a full import; see the module docs for the steps.
///
/// `on_decoded` is called with the number of data rows once the sheet has been read.
pub fn import_rankings<S, F>(
    store: &S,
    round_id: Option<&str>,
    bytes: &[u8],
    file_name: &str,
    synonyms: &HeaderSynonyms,
    mut on_decoded: F,
) -> Result<ImportSummary, ImportError>
where
    S: RankingStore + ?Sized,
    F: FnMut(usize),
{
    let round_id = round_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ImportError::Validation)?;
    let mut hasher = md5::Context::new();
    hasher.consume(bytes);
    let checksum = format!("{:x}", hasher.finalize());
    info!(
        "Importing '{}' ({} bytes, md5 {}) into round {}",
        file_name,
        bytes.len(),
        checksum,
        round_id
    );

    let sheet = decode_workbook(bytes, file_name)?;
    on_decoded(sheet.rows.len());

    let resolved: Vec<ResolvedRow> = sheet
        .rows
        .into_iter()
        .map(|row| ResolvedRow::resolve(row, synonyms))
        .collect();
    let rows = deduplicate(resolved);
    let renamed = rows.iter().filter(|r| r.renamed_from.is_some()).count();

    let batch = build_batch(round_id, &sheet.headers, &rows, &now_timestamp())?;
    store.replace_rankings(round_id, &batch).map_err(|e| {
        error!("Storing rankings for round {} failed: {}", round_id, e);
        ImportError::Persistence(e)
    })?;

    info!(
        "Round {} now holds {} rankings ({} renamed)",
        round_id,
        rows.len(),
        renamed
    );
    Ok(ImportSummary {
        round_id: round_id.to_string(),
        inserted: rows.len(),
        renamed,
        columns: sheet.headers,
        checksum,
    })
}
