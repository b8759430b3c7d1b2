use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Backend user ids are integer primary keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one authenticated session.
///
/// A fresh id is minted every time a session is committed or restored, so a
/// response can be matched against the session that issued its request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The authenticated user as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// The backend reports a linked Google account as a boolean `google_id`.
    #[serde(default, rename = "google_id")]
    pub google_linked: bool,
    #[serde(default)]
    pub is_verified: bool,
}

/// Credential and profile, always held together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Credential,
    pub profile: Profile,
}

impl Session {
    pub fn new(credential: Credential, profile: Profile) -> Self {
        Self {
            credential,
            profile,
        }
    }
}

/// Entities that can be liked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Trick,
    Reply,
}

impl EntityKind {
    /// Collection segment used in engagement routes.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Trick => "tricks",
            Self::Reply => "replies",
        }
    }
}

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trick" => Ok(Self::Trick),
            "reply" => Ok(Self::Reply),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: i64,
}

impl EntityKey {
    pub fn trick(id: i64) -> Self {
        Self {
            kind: EntityKind::Trick,
            id,
        }
    }

    pub fn reply(id: i64) -> Self {
        Self {
            kind: EntityKind::Reply,
            id,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.collection(), self.id)
    }
}

/// User-generated content subject to moderation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Trick,
    Comment,
    Topic,
    Reply,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trick => "trick",
            Self::Comment => "comment",
            Self::Topic => "topic",
            Self::Reply => "reply",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trick" => Ok(Self::Trick),
            "comment" => Ok(Self::Comment),
            "topic" => Ok(Self::Topic),
            "reply" => Ok(Self::Reply),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown kind: {0}")]
pub struct UnknownKind(pub String);

/// A concrete piece of content plus its author, when known.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub id: i64,
    pub owner_id: Option<UserId>,
}

impl Resource {
    pub fn new(kind: ResourceKind, id: i64, owner_id: Option<UserId>) -> Self {
        Self { kind, id, owner_id }
    }

    pub fn trick(id: i64, owner_id: UserId) -> Self {
        Self::new(ResourceKind::Trick, id, Some(owner_id))
    }
}
