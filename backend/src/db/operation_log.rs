use super::{now_timestamp, Database, StoreError};
use common::model::operation_log::OperationLog;
use log::warn;
use rusqlite::params;

impl Database {
    /// Appends one audit entry. `target` is usually a round or series id.
    pub fn record_operation(
        &self,
        action: &str,
        target: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), StoreError> {
        self.connect()?.execute(
            "INSERT INTO operation_logs (action, target, detail, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![action, target, detail, now_timestamp()],
        )?;
        Ok(())
    }

    /// Audit logging never fails the operation being audited.
    pub fn record_operation_quietly(
        &self,
        action: &str,
        target: Option<&str>,
        detail: Option<&str>,
    ) {
        if let Err(e) = self.record_operation(action, target, detail) {
            warn!("Could not write operation log entry '{}': {}", action, e);
        }
    }

    /// Newest entries first.
    pub fn recent_operations(&self, limit: u32) -> Result<Vec<OperationLog>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, action, target, detail, created_at
             FROM operation_logs ORDER BY id DESC LIMIT ?1",
        )?;
        let entries = stmt
            .query_map(params![limit], |row| {
                Ok(OperationLog {
                    id: row.get(0)?,
                    action: row.get(1)?,
                    target: row.get(2)?,
                    detail: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::testing::temp_database;
    use crate::db::Database;

    #[test]
    fn recent_operations_are_newest_first() {
        let (_dir, database) = temp_database();
        database.record_operation("create_series", Some("s1"), None).unwrap();
        database
            .record_operation("import_rankings", Some("r1"), Some("12 rows"))
            .unwrap();

        let entries = database.recent_operations(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "import_rankings");
        assert_eq!(entries[0].detail.as_deref(), Some("12 rows"));
        assert_eq!(database.recent_operations(1).unwrap().len(), 1);
    }

    #[test]
    fn quiet_recording_swallows_failures() {
        let dir = tempfile::tempdir().unwrap();
        // No schema: every insert fails.
        let database = Database::new(dir.path().join("bare.sqlite"));
        database.record_operation_quietly("import_rankings", Some("r1"), None);
        assert!(database.record_operation("import_rankings", None, None).is_err());
    }
}
