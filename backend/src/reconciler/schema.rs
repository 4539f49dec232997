//! Persistence batch assembly and the reverse mapping back to a display table.

use super::dedupe::ResolvedRow;
use common::model::cell::CellValue;
use common::model::ranking::{RankingRecord, RankingTable, RankingTableRow, SchemaDescriptor};

/// The schema descriptor followed by one record per row. Payloads hold the
/// row exactly as decoded, regardless of any identity rename.
pub fn build_batch(
    round_id: &str,
    columns: &[String],
    rows: &[ResolvedRow],
    created_at: &str,
) -> Result<Vec<RankingRecord>, serde_json::Error> {
    let mut batch = Vec::with_capacity(rows.len() + 1);
    batch.push(
        SchemaDescriptor {
            columns: columns.to_vec(),
        }
        .into_record(round_id, created_at)?,
    );
    for resolved in rows {
        batch.push(RankingRecord::imported(
            round_id,
            &resolved.driver_identity,
            resolved.rank,
            resolved.points,
            serde_json::to_string(&resolved.row)?,
            created_at,
        ));
    }
    Ok(batch)
}

/// Lays stored records out by the round's schema, ordered by rank then points.
pub fn build_table(
    round_id: &str,
    records: &[RankingRecord],
) -> Result<RankingTable, serde_json::Error> {
    let columns = match records.iter().find(|r| r.is_schema_descriptor()) {
        Some(record) => SchemaDescriptor::from_record(record)?.columns,
        None => Vec::new(),
    };

    let mut rows = Vec::with_capacity(records.len());
    for record in records.iter().filter(|r| !r.is_schema_descriptor()) {
        let payload = record.payload()?;
        rows.push(RankingTableRow {
            driver_identity: record.driver_identity.clone(),
            rank: record.rank,
            points: record.points,
            cells: columns
                .iter()
                .map(|column| payload.get(column).cloned().unwrap_or(CellValue::Null))
                .collect(),
        });
    }
    rows.sort_by(|a, b| a.rank.cmp(&b.rank).then(b.points.cmp(&a.points)));

    Ok(RankingTable {
        round_id: round_id.to_string(),
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::fields::HeaderSynonyms;
    use common::model::cell::SheetRow;

    const CREATED: &str = "2024-05-12T10:00:00+00:00";

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn resolved(cells: &[(&str, CellValue)]) -> ResolvedRow {
        let row: SheetRow = cells.iter().cloned().collect();
        ResolvedRow::resolve(row, &HeaderSynonyms::default())
    }

    #[test]
    fn batch_starts_with_descriptor() {
        let rows = vec![resolved(&[
            ("Rank", CellValue::Integer(1)),
            ("Name", CellValue::Text("Alice".into())),
        ])];
        let batch = build_batch("r1", &columns(&["Rank", "Name"]), &rows, CREATED).unwrap();

        assert_eq!(batch.len(), 2);
        assert!(batch[0].is_schema_descriptor());
        assert_eq!(batch[1].driver_identity, "Alice");
        assert_eq!(batch[1].rank, 1);
        assert!(batch.iter().all(|r| r.round_id == "r1" && r.created_at == CREATED));
    }

    #[test]
    fn payload_round_trips_and_ignores_rename() {
        let mut row = resolved(&[
            ("Name", CellValue::Text("Bob".into())),
            ("Best lap", CellValue::Float(61.237)),
            ("Pit", CellValue::Bool(true)),
            ("Note", CellValue::Null),
        ]);
        let original = row.row.clone();
        row.driver_identity = "Bob_1".into();
        row.renamed_from = Some("Bob".into());

        let batch = build_batch(
            "r1",
            &columns(&["Name", "Best lap", "Pit", "Note"]),
            &[row],
            CREATED,
        )
        .unwrap();

        assert_eq!(batch[1].driver_identity, "Bob_1");
        assert_eq!(batch[1].payload().unwrap(), original);
        let json: serde_json::Value = serde_json::from_str(&batch[1].raw_payload_json).unwrap();
        assert_eq!(json["Name"], "Bob");
    }

    #[test]
    fn table_resolves_cells_through_schema() {
        let rows = vec![
            resolved(&[
                ("A", CellValue::Text("a2".into())),
                ("B", CellValue::Integer(20)),
                ("C", CellValue::Null),
                ("Rank", CellValue::Integer(2)),
            ]),
            resolved(&[
                ("A", CellValue::Text("a1".into())),
                ("B", CellValue::Integer(10)),
                ("C", CellValue::Text("c1".into())),
                ("Rank", CellValue::Integer(1)),
            ]),
        ];
        let batch =
            build_batch("r1", &columns(&["A", "B", "C", "Rank"]), &rows, CREATED).unwrap();
        let table = build_table("r1", &batch).unwrap();

        assert_eq!(table.columns, columns(&["A", "B", "C", "Rank"]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0], CellValue::Text("a1".into()));
        assert_eq!(table.rows[0].cells[1], CellValue::Integer(10));
        assert_eq!(table.rows[1].cells[1], CellValue::Integer(20));
        assert_eq!(table.rows[1].cells[2], CellValue::Null);
    }

    #[test]
    fn equal_ranks_order_by_points_descending() {
        let rows = vec![
            resolved(&[("Name", CellValue::Text("x".into())), ("Points", CellValue::Integer(3))]),
            resolved(&[("Name", CellValue::Text("y".into())), ("Points", CellValue::Integer(9))]),
        ];
        let batch = build_batch("r1", &columns(&["Name", "Points"]), &rows, CREATED).unwrap();
        let table = build_table("r1", &batch).unwrap();
        assert_eq!(table.rows[0].driver_identity, "y");
    }

    #[test]
    fn table_without_descriptor_has_no_columns() {
        let table = build_table("r1", &[]).unwrap();
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }
}
