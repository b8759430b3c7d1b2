//! Deleting user content and the admin dashboard.
//!
//! Authorization is re-checked here before anything is sent, whatever the
//! calling view already decided. The route is picked by [`route_for`] from
//! the resource kind and whether the caller is deleting as owner or as admin.

use std::sync::Arc;

use ollie_shared::protocol::{Dashboard, MessageResponse};
use ollie_shared::{policy, Profile, Resource, ResourceKind};
use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::http::RequestAuthenticator;

/// Asks the user to confirm a destructive action.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The backend deleted the resource; the caller should prune it.
    Removed,
    /// The user declined; nothing was sent.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalRoute {
    /// The author deleting their own trick.
    Owner,
    Admin,
}

pub fn confirmation_prompt(kind: ResourceKind) -> String {
    format!("Are you sure you want to delete this {kind}?")
}

/// Backend path that deletes `kind`/`id` through `route`.
///
/// Only tricks have an owner route; every other kind always goes through the
/// admin routes.
pub fn route_for(kind: ResourceKind, id: i64, route: RemovalRoute) -> String {
    match (kind, route) {
        (ResourceKind::Trick, RemovalRoute::Owner) => format!("/tricks/{id}"),
        (ResourceKind::Trick, RemovalRoute::Admin) => format!("/admin/tricks/{id}"),
        (ResourceKind::Comment, _) => format!("/admin/comments/{id}"),
        (ResourceKind::Topic, _) => format!("/admin/forum/topics/{id}"),
        (ResourceKind::Reply, _) => format!("/admin/forum/replies/{id}"),
    }
}

/// Owners delete their own tricks through the owner route, even when they are
/// also admins.
pub fn removal_route(profile: &Profile, resource: &Resource) -> RemovalRoute {
    let owns = resource
        .owner_id
        .is_some_and(|owner| policy::owns_resource(Some(profile), owner));
    if resource.kind == ResourceKind::Trick && owns {
        RemovalRoute::Owner
    } else {
        RemovalRoute::Admin
    }
}

pub struct ModerationGateway {
    api: Arc<RequestAuthenticator>,
}

impl ModerationGateway {
    pub fn new(api: Arc<RequestAuthenticator>) -> Self {
        Self { api }
    }

    /// Whether the delete affordance should be shown for `resource`.
    pub fn can_remove(&self, resource: &Resource) -> bool {
        policy::can_moderate(self.api.session().profile().as_ref(), resource)
    }

    pub async fn remove(
        &self,
        resource: Resource,
        confirmer: &dyn Confirmer,
    ) -> Result<RemovalOutcome> {
        let profile = self
            .api
            .session()
            .profile()
            .ok_or(ClientError::NotAuthenticated)?;
        if !policy::can_moderate(Some(&profile), &resource) {
            return Err(ClientError::AuthorizationDenied(format!(
                "You cannot delete this {}",
                resource.kind
            )));
        }
        if !confirmer.confirm(&confirmation_prompt(resource.kind)) {
            return Ok(RemovalOutcome::Cancelled);
        }

        let route = removal_route(&profile, &resource);
        let path = route_for(resource.kind, resource.id, route);
        match self.api.delete::<MessageResponse>(&path).await {
            Ok(_) => {
                info!(kind = %resource.kind, id = resource.id, ?route, "resource removed");
                Ok(RemovalOutcome::Removed)
            }
            Err(e) => {
                warn!(kind = %resource.kind, id = resource.id, error = %e, "removal failed");
                Err(e)
            }
        }
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let profile = self.api.session().profile();
        if !policy::is_authenticated(profile.as_ref()) {
            return Err(ClientError::NotAuthenticated);
        }
        if !policy::is_admin(profile.as_ref()) {
            return Err(ClientError::AuthorizationDenied(
                "Admin access required".into(),
            ));
        }
        Ok(self.api.get::<Dashboard>("/admin/dashboard").await?.data)
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{delete, get};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::testing::{login_as, profile, spawn_backend, test_context, Hits};
    use ollie_shared::UserId;

    fn recording_backend(hits: Hits) -> Router {
        let h = hits.clone();
        let admin_tricks = move |Path(id): Path<i64>| {
            let h = h.clone();
            async move {
                h.record(&format!("DELETE /admin/tricks/{id}"));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
            }
        };
        let h = hits.clone();
        let own_tricks = move |Path(id): Path<i64>| {
            let h = h.clone();
            async move {
                h.record(&format!("DELETE /tricks/{id}"));
                Json(json!({ "message": "Trick deleted" }))
            }
        };
        let h = hits;
        let replies = move |Path(id): Path<i64>| {
            let h = h.clone();
            async move {
                h.record(&format!("DELETE /admin/forum/replies/{id}"));
                Json(json!({ "message": "Reply deleted" }))
            }
        };
        Router::new()
            .route("/admin/tricks/:id", delete(admin_tricks))
            .route("/tricks/:id", delete(own_tricks))
            .route("/admin/forum/replies/:id", delete(replies))
    }

    #[test]
    fn test_route_mapping() {
        assert_eq!(route_for(ResourceKind::Trick, 3, RemovalRoute::Owner), "/tricks/3");
        assert_eq!(route_for(ResourceKind::Trick, 3, RemovalRoute::Admin), "/admin/tricks/3");
        assert_eq!(route_for(ResourceKind::Comment, 4, RemovalRoute::Admin), "/admin/comments/4");
        assert_eq!(
            route_for(ResourceKind::Topic, 5, RemovalRoute::Admin),
            "/admin/forum/topics/5"
        );
        assert_eq!(
            route_for(ResourceKind::Reply, 6, RemovalRoute::Owner),
            "/admin/forum/replies/6"
        );
    }

    #[test]
    fn test_owner_route_wins_for_admin_authors() {
        let admin = profile(1, true);
        assert_eq!(
            removal_route(&admin, &Resource::trick(2, UserId(1))),
            RemovalRoute::Owner
        );
        assert_eq!(
            removal_route(&admin, &Resource::trick(2, UserId(9))),
            RemovalRoute::Admin
        );
        assert_eq!(
            confirmation_prompt(ResourceKind::Topic),
            "Are you sure you want to delete this topic?"
        );
    }

    #[tokio::test]
    async fn test_failed_admin_delete_keeps_item() {
        let hits = Hits::default();
        let (_dir, ctx) = test_context(&spawn_backend(recording_backend(hits.clone())).await);
        login_as(&ctx, "admin", profile(1, true));
        let gateway = ctx.moderation();

        let mut tricks = vec![Resource::trick(7, UserId(2)), Resource::trick(8, UserId(2))];
        let target = tricks[0];
        match gateway.remove(target, &|_: &str| true).await {
            Ok(RemovalOutcome::Removed) => tricks.retain(|t| t.id != target.id),
            Ok(RemovalOutcome::Cancelled) => panic!("confirmed removal was cancelled"),
            Err(e) => assert!(matches!(e, ClientError::Api { status: 500, .. })),
        }

        assert_eq!(tricks.len(), 2);
        assert_eq!(hits.count("DELETE /admin/tricks/7"), 1);
        assert!(ctx.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_owner_deletes_through_owner_route() {
        let hits = Hits::default();
        let (_dir, ctx) = test_context(&spawn_backend(recording_backend(hits.clone())).await);
        login_as(&ctx, "tok", profile(2, false));
        let gateway = ctx.moderation();

        let outcome = gateway
            .remove(Resource::trick(7, UserId(2)), &|_: &str| true)
            .await
            .unwrap();
        assert_eq!(outcome, RemovalOutcome::Removed);
        assert_eq!(hits.count("DELETE /tricks/7"), 1);
        assert_eq!(hits.count("DELETE /admin/tricks/7"), 0);
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let hits = Hits::default();
        let (_dir, ctx) = test_context(&spawn_backend(recording_backend(hits.clone())).await);
        login_as(&ctx, "admin", profile(1, true));
        let gateway = ctx.moderation();

        let asked = std::cell::RefCell::new(Vec::new());
        let confirmer = |prompt: &str| {
            asked.borrow_mut().push(prompt.to_string());
            false
        };
        let reply = Resource::new(ResourceKind::Reply, 3, Some(UserId(5)));
        let outcome = gateway.remove(reply, &confirmer).await.unwrap();

        assert_eq!(outcome, RemovalOutcome::Cancelled);
        assert_eq!(
            asked.into_inner(),
            vec!["Are you sure you want to delete this reply?".to_string()]
        );
        assert_eq!(hits.total(), 0);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_remove_reply() {
        let hits = Hits::default();
        let (_dir, ctx) = test_context(&spawn_backend(recording_backend(hits.clone())).await);
        login_as(&ctx, "tok", profile(4, false));
        let gateway = ctx.moderation();

        let reply = Resource::new(ResourceKind::Reply, 3, Some(UserId(5)));
        assert!(!gateway.can_remove(&reply));

        let result = gateway.remove(reply, &|_: &str| true).await;
        assert!(matches!(result, Err(ClientError::AuthorizationDenied(_))));
        assert_eq!(hits.total(), 0);
    }

    #[tokio::test]
    async fn test_dashboard_requires_admin() {
        let hits = Hits::default();
        let h = hits.clone();
        let router = Router::new().route(
            "/admin/dashboard",
            get(move || {
                let h = h.clone();
                async move {
                    h.record("GET /admin/dashboard");
                    Json(json!({
                        "stats": {
                            "total_users": 3,
                            "total_tricks": 10,
                            "total_topics": 2,
                            "total_comments": 4,
                            "total_replies": 6
                        },
                        "recent_activity": {
                            "tricks": [{ "id": 1, "title": "Kickflip", "upvote_count": 2 }],
                            "topics": [],
                            "users": []
                        }
                    }))
                }
            }),
        );
        let (_dir, ctx) = test_context(&spawn_backend(router).await);
        let gateway = ctx.moderation();

        assert!(matches!(gateway.dashboard().await, Err(ClientError::NotAuthenticated)));

        login_as(&ctx, "tok", profile(2, false));
        assert!(matches!(
            gateway.dashboard().await,
            Err(ClientError::AuthorizationDenied(_))
        ));
        assert_eq!(hits.total(), 0);

        login_as(&ctx, "admin", profile(1, true));
        let dashboard = gateway.dashboard().await.unwrap();
        assert_eq!(dashboard.stats.total_tricks, 10);
        assert_eq!(dashboard.recent_activity.tricks[0].title, "Kickflip");
        assert_eq!(hits.count("GET /admin/dashboard"), 1);
    }
}
