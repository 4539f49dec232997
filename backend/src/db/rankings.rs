use super::{Database, StoreError};
use common::model::ranking::RankingRecord;
use rusqlite::{params, Connection};

/// The ranking table as seen by the import reconciler.
pub trait RankingStore {
    /// Removes every record of the round, schema descriptor included.
    fn delete_rankings(&self, round_id: &str) -> Result<(), StoreError>;

    /// Inserts the whole batch or nothing.
    fn insert_rankings(&self, records: &[RankingRecord]) -> Result<(), StoreError>;

    /// Swaps a round's records for `records`.
    ///
    /// The default runs delete then insert as two independent operations: if the
    /// insert fails the round is left empty. Stores that can do better override it.
    fn replace_rankings(
        &self,
        round_id: &str,
        records: &[RankingRecord],
    ) -> Result<(), StoreError> {
        self.delete_rankings(round_id)?;
        self.insert_rankings(records)
    }

    /// Every record of the round, schema descriptor included, in insertion order.
    fn load_rankings(&self, round_id: &str) -> Result<Vec<RankingRecord>, StoreError>;
}

fn delete_round_rankings(conn: &Connection, round_id: &str) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM rankings WHERE round_id = ?1", params![round_id])?)
}

fn insert_all(conn: &Connection, records: &[RankingRecord]) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "INSERT INTO rankings (round_id, driver_identity, rank, points, tier, safety_score,
                               podiums, finished_races, total_races, raw_payload_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for r in records {
        stmt.execute(params![
            r.round_id,
            r.driver_identity,
            r.rank,
            r.points,
            r.tier,
            r.safety_score,
            r.podiums,
            r.finished_races,
            r.total_races,
            r.raw_payload_json,
            r.created_at,
        ])?;
    }
    Ok(())
}

impl RankingStore for Database {
    fn delete_rankings(&self, round_id: &str) -> Result<(), StoreError> {
        delete_round_rankings(&self.connect()?, round_id)?;
        Ok(())
    }

    fn insert_rankings(&self, records: &[RankingRecord]) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        insert_all(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete and insert share one transaction, so a failed insert keeps the
    /// previous rankings.
    fn replace_rankings(
        &self,
        round_id: &str,
        records: &[RankingRecord],
    ) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        delete_round_rankings(&tx, round_id)?;
        insert_all(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    fn load_rankings(&self, round_id: &str) -> Result<Vec<RankingRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT round_id, driver_identity, rank, points, tier, safety_score, podiums,
                    finished_races, total_races, raw_payload_json, created_at
             FROM rankings WHERE round_id = ?1 ORDER BY id",
        )?;
        let records = stmt
            .query_map(params![round_id], |row| {
                Ok(RankingRecord {
                    round_id: row.get(0)?,
                    driver_identity: row.get(1)?,
                    rank: row.get(2)?,
                    points: row.get(3)?,
                    tier: row.get(4)?,
                    safety_score: row.get(5)?,
                    podiums: row.get(6)?,
                    finished_races: row.get(7)?,
                    total_races: row.get(8)?,
                    raw_payload_json: row.get(9)?,
                    created_at: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;

    fn record(round_id: &str, identity: &str, rank: i64) -> RankingRecord {
        RankingRecord::imported(round_id, identity, rank, 0, "{}".into(), "2024-01-01T00:00:00Z")
    }

    fn identities(database: &Database, round_id: &str) -> Vec<String> {
        database
            .load_rankings(round_id)
            .unwrap()
            .into_iter()
            .map(|r| r.driver_identity)
            .collect()
    }

    #[test]
    fn replace_swaps_round_records() {
        let (_dir, database) = temp_database();
        let series = database.create_series("Cup", None).unwrap();
        let round = database.create_round(&series.id, "R1", Some(1), None).unwrap();

        database
            .replace_rankings(&round.id, &[record(&round.id, "A", 1), record(&round.id, "B", 2)])
            .unwrap();
        database
            .replace_rankings(&round.id, &[record(&round.id, "C", 1)])
            .unwrap();

        assert_eq!(identities(&database, &round.id), vec!["C"]);
    }

    #[test]
    fn failed_replace_keeps_previous_records() {
        let (_dir, database) = temp_database();
        let series = database.create_series("Cup", None).unwrap();
        let round = database.create_round(&series.id, "R1", None, None).unwrap();
        database
            .replace_rankings(&round.id, &[record(&round.id, "A", 1)])
            .unwrap();

        let clash = [record(&round.id, "B", 1), record(&round.id, "B", 2)];
        assert!(database.replace_rankings(&round.id, &clash).is_err());

        assert_eq!(identities(&database, &round.id), vec!["A"]);
    }

    #[test]
    fn rankings_require_an_existing_round() {
        let (_dir, database) = temp_database();
        let err = database
            .insert_rankings(&[record("missing", "A", 1)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
