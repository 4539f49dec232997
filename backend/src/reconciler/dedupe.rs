use super::fields::{resolve_essential_fields, HeaderSynonyms};
use common::model::cell::SheetRow;
use common::model::ranking::METADATA_IDENTITY;
use log::warn;
use std::collections::HashSet;

/// A data row with its derived storage fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub driver_identity: String,
    pub rank: i64,
    pub points: i64,
    /// Identity before deduplication, when it had to be changed.
    pub renamed_from: Option<String>,
    pub row: SheetRow,
}

impl ResolvedRow {
    pub fn resolve(row: SheetRow, synonyms: &HeaderSynonyms) -> Self {
        let fields = resolve_essential_fields(&row, synonyms);
        Self {
            driver_identity: fields.driver_identity,
            rank: fields.rank,
            points: fields.points,
            renamed_from: None,
            row,
        }
    }
}

/// Makes driver identities unique, keeping every row and its original order.
///
/// A colliding identity becomes `<identity>_<n>` with the smallest free `n`.
/// The schema descriptor's identity counts as taken.
pub fn deduplicate(rows: Vec<ResolvedRow>) -> Vec<ResolvedRow> {
    let mut taken: HashSet<String> = HashSet::with_capacity(rows.len() + 1);
    taken.insert(METADATA_IDENTITY.to_string());

    let mut unique = Vec::with_capacity(rows.len());
    for mut resolved in rows {
        if taken.contains(&resolved.driver_identity) {
            let original = resolved.driver_identity.clone();
            let renamed = (1..)
                .map(|n| format!("{}_{}", original, n))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_default();
            warn!("Duplicate driver identity '{}' stored as '{}'", original, renamed);
            resolved.driver_identity = renamed;
            resolved.renamed_from = Some(original);
        }
        taken.insert(resolved.driver_identity.clone());
        unique.push(resolved);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::cell::CellValue;

    fn row_for(identity: &str, lap: i64) -> ResolvedRow {
        ResolvedRow {
            driver_identity: identity.to_string(),
            rank: 1,
            points: 0,
            renamed_from: None,
            row: [("Lap", CellValue::Integer(lap))].into_iter().collect(),
        }
    }

    fn identities(rows: &[ResolvedRow]) -> Vec<&str> {
        rows.iter().map(|r| r.driver_identity.as_str()).collect()
    }

    #[test]
    fn collisions_get_increasing_suffixes_in_order() {
        let rows = deduplicate(vec![
            row_for("Bob", 1),
            row_for("Alice", 2),
            row_for("Bob", 3),
            row_for("Bob", 4),
        ]);

        assert_eq!(identities(&rows), vec!["Bob", "Alice", "Bob_1", "Bob_2"]);
        assert_eq!(rows[2].renamed_from.as_deref(), Some("Bob"));
        assert_eq!(rows[3].row.get("Lap"), Some(&CellValue::Integer(4)));
    }

    #[test]
    fn suffix_skips_identities_already_present() {
        let rows = deduplicate(vec![row_for("Bob", 1), row_for("Bob_1", 2), row_for("Bob", 3)]);
        assert_eq!(identities(&rows), vec!["Bob", "Bob_1", "Bob_2"]);
    }

    #[test]
    fn reserved_identity_is_never_reused() {
        let rows = deduplicate(vec![row_for(METADATA_IDENTITY, 1)]);
        assert_eq!(identities(&rows), vec!["__METADATA___1"]);
    }
}
