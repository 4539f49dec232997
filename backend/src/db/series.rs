use super::{now_timestamp, Database, StoreError};
use common::model::series::{Round, Series};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

impl Database {
    /// Stores a new series under a generated id.
    pub fn create_series(&self, name: &str, season: Option<&str>) -> Result<Series, StoreError> {
        let series = Series {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            season: season.map(str::to_string),
            created_at: now_timestamp(),
        };
        self.connect()?.execute(
            "INSERT INTO series (id, name, season, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![series.id, series.name, series.season, series.created_at],
        )?;
        Ok(series)
    }

    /// Every series, newest first.
    pub fn list_series(&self) -> Result<Vec<Series>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, season, created_at FROM series ORDER BY created_at DESC, name",
        )?;
        let series = stmt
            .query_map([], |row| {
                Ok(Series {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    season: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(series)
    }

    /// Deletes a series with its rounds and their rankings.
    pub fn delete_series(&self, id: &str) -> Result<(), StoreError> {
        let deleted = self
            .connect()?
            .execute("DELETE FROM series WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("series {}", id)));
        }
        Ok(())
    }

    /// Adds a round to `series_id`.
    ///
    /// # Errors
    /// `StoreError::NotFound` when the series does not exist.
    pub fn create_round(
        &self,
        series_id: &str,
        name: &str,
        round_number: Option<i64>,
        race_date: Option<&str>,
    ) -> Result<Round, StoreError> {
        let conn = self.connect()?;
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM series WHERE id = ?1",
                params![series_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::NotFound(format!("series {}", series_id)));
        }

        let round = Round {
            id: Uuid::new_v4().to_string(),
            series_id: series_id.to_string(),
            name: name.to_string(),
            round_number,
            race_date: race_date.map(str::to_string),
            created_at: now_timestamp(),
        };
        conn.execute(
            "INSERT INTO rounds (id, series_id, name, round_number, race_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                round.id,
                round.series_id,
                round.name,
                round.round_number,
                round.race_date,
                round.created_at
            ],
        )?;
        Ok(round)
    }

    /// Looks a round up by id, `StoreError::NotFound` if it is missing.
    pub fn get_round(&self, id: &str) -> Result<Round, StoreError> {
        self.connect()?
            .query_row(
                "SELECT id, series_id, name, round_number, race_date, created_at
                 FROM rounds WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Round {
                        id: row.get(0)?,
                        series_id: row.get(1)?,
                        name: row.get(2)?,
                        round_number: row.get(3)?,
                        race_date: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("round {}", id)))
    }

    /// Rounds of a series by round number; unnumbered rounds last.
    pub fn list_rounds(&self, series_id: &str) -> Result<Vec<Round>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, series_id, name, round_number, race_date, created_at
             FROM rounds WHERE series_id = ?1
             ORDER BY round_number IS NULL, round_number, created_at",
        )?;
        let rounds = stmt
            .query_map(params![series_id], |row| {
                Ok(Round {
                    id: row.get(0)?,
                    series_id: row.get(1)?,
                    name: row.get(2)?,
                    round_number: row.get(3)?,
                    race_date: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rounds)
    }

    /// Deletes a round and, through the foreign key cascade, its rankings.
    pub fn delete_round(&self, id: &str) -> Result<(), StoreError> {
        let deleted = self
            .connect()?
            .execute("DELETE FROM rounds WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("round {}", id)));
        }
        Ok(())
    }
}
