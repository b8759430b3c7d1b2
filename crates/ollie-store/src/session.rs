//! Persisted session record.
//!
//! A session is stored as two entries under fixed keys: the bearer token and
//! the JSON-serialized profile. Both are written and erased in a single
//! transaction so the table never holds one without the other, and anything
//! that does not decode as a complete pair is reported as corrupt rather than
//! as an error.

use ollie_shared::constants::{TOKEN_STORAGE_KEY, USER_STORAGE_KEY};
use ollie_shared::{Credential, Profile, Session};

use crate::database::Database;
use crate::error::Result;

/// Outcome of reading the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedSession {
    /// Nothing stored.
    Absent,
    /// A complete, well-formed session.
    Complete(Session),
    /// Something is stored but it is not a usable session.
    Corrupt(String),
}

impl Database {
    /// Persist credential and profile together.
    pub fn save_session(&mut self, session: &Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.profile)?;
        self.put_values(&[
            (TOKEN_STORAGE_KEY, session.credential.as_str()),
            (USER_STORAGE_KEY, &user_json),
        ])
    }

    pub fn load_session(&self) -> Result<LoadedSession> {
        let token = self.get_value(TOKEN_STORAGE_KEY)?;
        let user = self.get_value(USER_STORAGE_KEY)?;

        let loaded = match (token, user) {
            (None, None) => LoadedSession::Absent,
            (Some(_), None) => LoadedSession::Corrupt("token stored without user".into()),
            (None, Some(_)) => LoadedSession::Corrupt("user stored without token".into()),
            (Some(token), Some(user_json)) => {
                let credential = Credential::new(token);
                if credential.is_empty() {
                    return Ok(LoadedSession::Corrupt("empty token".into()));
                }
                match serde_json::from_str::<Profile>(&user_json) {
                    Ok(profile) => LoadedSession::Complete(Session::new(credential, profile)),
                    Err(e) => LoadedSession::Corrupt(format!("unreadable user record: {e}")),
                }
            }
        };
        Ok(loaded)
    }

    /// Erase both session entries. Returns whether anything was stored.
    pub fn clear_session(&mut self) -> Result<bool> {
        let removed = self.delete_values(&[TOKEN_STORAGE_KEY, USER_STORAGE_KEY])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollie_shared::UserId;

    fn sample_session() -> Session {
        Session::new(
            Credential::new("tok-123"),
            Profile {
                id: UserId(12),
                username: "elissa".into(),
                email: "elissa@example.com".into(),
                region: Some("California".into()),
                is_admin: false,
                google_linked: false,
                is_verified: true,
            },
        )
    }

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_dir(dir.path()).unwrap();
        (dir, db)
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, mut db) = open();
        assert_eq!(db.load_session().unwrap(), LoadedSession::Absent);

        let session = sample_session();
        db.save_session(&session).unwrap();
        assert_eq!(db.load_session().unwrap(), LoadedSession::Complete(session));
    }

    #[test]
    fn test_clear_removes_both_entries() {
        let (_dir, mut db) = open();
        db.save_session(&sample_session()).unwrap();

        assert!(db.clear_session().unwrap());
        assert_eq!(db.get_value(TOKEN_STORAGE_KEY).unwrap(), None);
        assert_eq!(db.get_value(USER_STORAGE_KEY).unwrap(), None);

        // Second clear is a no-op.
        assert!(!db.clear_session().unwrap());
    }

    #[test]
    fn test_corrupt_user_record() {
        let (_dir, mut db) = open();
        db.put_values(&[(TOKEN_STORAGE_KEY, "tok"), (USER_STORAGE_KEY, "{not json")])
            .unwrap();
        assert!(matches!(db.load_session().unwrap(), LoadedSession::Corrupt(_)));
    }

    #[test]
    fn test_partial_record_is_corrupt() {
        let (_dir, mut db) = open();
        db.put_values(&[(TOKEN_STORAGE_KEY, "tok")]).unwrap();
        assert!(matches!(db.load_session().unwrap(), LoadedSession::Corrupt(_)));

        db.clear_session().unwrap();
        let user_json = serde_json::to_string(&sample_session().profile).unwrap();
        db.put_values(&[(USER_STORAGE_KEY, &user_json)]).unwrap();
        assert!(matches!(db.load_session().unwrap(), LoadedSession::Corrupt(_)));
    }

    #[test]
    fn test_empty_token_is_corrupt() {
        let (_dir, mut db) = open();
        let user_json = serde_json::to_string(&sample_session().profile).unwrap();
        db.put_values(&[(TOKEN_STORAGE_KEY, "  "), (USER_STORAGE_KEY, &user_json)])
            .unwrap();
        assert!(matches!(db.load_session().unwrap(), LoadedSession::Corrupt(_)));
    }
}
