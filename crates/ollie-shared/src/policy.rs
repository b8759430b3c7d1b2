//! Authorization decisions.
//!
//! Every function here is pure: it looks only at the profile of the current
//! session (or its absence) and the resource in question. Views render their
//! affordances from these answers and the client re-checks them before
//! dispatching, so no caller keeps its own copy of these rules.

use crate::types::{Profile, Resource, ResourceKind, UserId};

/// Something a caller may ask permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Admin,
    OwnsResource(UserId),
    Moderate(Resource),
    Engage,
}

pub fn is_authenticated(profile: Option<&Profile>) -> bool {
    profile.is_some()
}

pub fn is_admin(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| p.is_admin)
}

pub fn owns_resource(profile: Option<&Profile>, owner_id: UserId) -> bool {
    profile.is_some_and(|p| p.id == owner_id)
}

/// Whether the profile may delete `resource`.
///
/// Admins may delete anything. Tricks may also be deleted by their author.
/// Comments, topics and replies have no owner path.
pub fn can_moderate(profile: Option<&Profile>, resource: &Resource) -> bool {
    if is_admin(profile) {
        return true;
    }
    match resource.kind {
        ResourceKind::Trick => resource
            .owner_id
            .is_some_and(|owner| owns_resource(profile, owner)),
        ResourceKind::Comment | ResourceKind::Topic | ResourceKind::Reply => false,
    }
}

/// Whether the like/unlike control is available.
pub fn can_engage(profile: Option<&Profile>) -> bool {
    is_authenticated(profile)
}

pub fn allows(profile: Option<&Profile>, capability: &Capability) -> bool {
    match capability {
        Capability::Authenticated => is_authenticated(profile),
        Capability::Admin => is_admin(profile),
        Capability::OwnsResource(owner) => owns_resource(profile, *owner),
        Capability::Moderate(resource) => can_moderate(profile, resource),
        Capability::Engage => can_engage(profile),
    }
}
