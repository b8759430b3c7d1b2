//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// File name of the client database inside the data directory.
pub const DB_FILE_NAME: &str = "ollie.db";

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Platform-appropriate data directory for the client:
    /// - Linux:   `~/.local/share/ollie`
    /// - macOS:   `~/Library/Application Support/com.ollie.ollie`
    /// - Windows: `{FOLDERID_RoamingAppData}\ollie\ollie\data`
    pub fn default_data_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "ollie", "ollie").ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().to_path_buf())
    }

    /// Open (or create) the database in the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open_in_dir(&Self::default_data_dir()?)
    }

    /// Open (or create) `ollie.db` inside `data_dir`, creating the directory
    /// if needed.
    pub fn open_in_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join(DB_FILE_NAME);

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // journal_mode answers with the mode it settled on.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying connection.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
