//! Key/value operations on the `client_storage` table.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Read a single value.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM client_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write several values in one transaction; either all land or none do.
    pub fn put_values(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn_mut().transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO client_storage (key, value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete several keys in one transaction. Returns the number of rows removed.
    pub fn delete_values(&mut self, keys: &[&str]) -> Result<usize> {
        let tx = self.conn_mut().transaction()?;
        let mut removed = 0;
        for key in keys {
            removed += tx.execute("DELETE FROM client_storage WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_in_dir(dir.path()).unwrap();

        assert_eq!(db.get_value("theme").unwrap(), None);

        db.put_values(&[("theme", "dark"), ("lang", "fr")]).unwrap();
        assert_eq!(db.get_value("theme").unwrap().as_deref(), Some("dark"));

        db.put_values(&[("theme", "light")]).unwrap();
        assert_eq!(db.get_value("theme").unwrap().as_deref(), Some("light"));

        assert_eq!(db.delete_values(&["theme", "lang", "missing"]).unwrap(), 2);
        assert_eq!(db.get_value("lang").unwrap(), None);
    }
}
