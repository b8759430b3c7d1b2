//! JSON payloads exchanged with the REST backend.

use serde::{Deserialize, Serialize};

use crate::types::{Credential, Profile, UserId};

/// `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/google`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAuthRequest {
    /// Google ID token obtained by the sign-in widget.
    pub token: String,
}

/// Reply of every sign-in endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: Credential,
    pub user: Profile,
}

/// `POST /register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub region: String,
    pub password: String,
}

/// `POST /forgot-password`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// `POST /reset-password/:token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// `PUT /user/profile`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub username: String,
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_token: Option<String>,
}

/// Reply of the upvote status and toggle endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpvoteStatus {
    pub upvoted: bool,
    pub upvote_count: u32,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error payload returned with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Admin dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_tricks: u64,
    pub total_topics: u64,
    pub total_comments: u64,
    pub total_replies: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrickSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub upvote_count: u32,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub reply_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentActivity {
    #[serde(default)]
    pub tricks: Vec<TrickSummary>,
    #[serde(default)]
    pub topics: Vec<TopicSummary>,
    #[serde(default)]
    pub users: Vec<Profile>,
}

/// `GET /admin/dashboard`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    #[serde(default)]
    pub recent_activity: RecentActivity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_omits_absent_secrets() {
        let req = ProfileUpdateRequest {
            username: "tony".into(),
            region: Some("Auvergne".into()),
            google_token: Some("gtok".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["username"], "tony");
        assert_eq!(json["googleToken"], "gtok");
        assert!(json.get("currentPassword").is_none());
        assert!(json.get("newPassword").is_none());
    }

    #[test]
    fn test_negative_upvote_count_is_rejected() {
        let bad = r#"{"upvoted": true, "upvote_count": -1}"#;
        assert!(serde_json::from_str::<UpvoteStatus>(bad).is_err());
    }
}
