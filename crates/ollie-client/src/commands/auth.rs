use tracing::{info, warn};

use ollie_shared::forms::{
    ForgotPasswordForm, LoginForm, ProfileForm, RegisterForm, ResetPasswordForm,
};
use ollie_shared::protocol::{AuthResponse, GoogleAuthRequest, MessageResponse};
use ollie_shared::{Profile, Session, SessionId};

use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, SessionEndReason};
use crate::state::ClientContext;

/// Email/password sign-in.
pub async fn login(ctx: &ClientContext, email: &str, password: &str) -> Result<Profile> {
    let request = LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    }
    .validate()?;

    info!(email = %request.email, "Logging in");
    let response = ctx
        .api
        .post_public::<_, AuthResponse>("/login", &request)
        .await?;
    start_session(ctx, response.data)
}

/// Sign in with an ID token issued by Google.
pub async fn google_sign_in(ctx: &ClientContext, google_credential: &str) -> Result<Profile> {
    let token = google_credential.trim();
    if token.is_empty() {
        return Err(ClientError::Validation("Google credential is missing".into()));
    }

    info!("Signing in with Google");
    let request = GoogleAuthRequest {
        token: token.to_string(),
    };
    let response = ctx
        .api
        .post_public::<_, AuthResponse>("/auth/google", &request)
        .await?;
    start_session(ctx, response.data)
}

/// Create an account. No session starts until the email is verified.
pub async fn register(ctx: &ClientContext, form: RegisterForm) -> Result<String> {
    let request = form.validate()?;

    info!(username = %request.username, "Registering account");
    let response = ctx
        .api
        .post_public::<_, MessageResponse>("/register", &request)
        .await?;
    Ok(response
        .data
        .message
        .unwrap_or_else(|| "Registration successful, check your email".into()))
}

pub async fn verify_email(ctx: &ClientContext, token: &str) -> Result<String> {
    let token = token.trim();
    if token.is_empty() || token.contains('/') {
        return Err(ClientError::Validation("Invalid verification link".into()));
    }

    let response = ctx
        .api
        .get_public::<MessageResponse>(&format!("/verify-email/{token}"))
        .await?;
    Ok(response
        .data
        .message
        .unwrap_or_else(|| "Email verified successfully".into()))
}

/// Ask the backend to email a password reset link.
///
/// The backend answers the same way whether or not the address is known.
pub async fn forgot_password(ctx: &ClientContext, email: &str) -> Result<String> {
    let request = ForgotPasswordForm {
        email: email.to_string(),
    }
    .validate()?;

    info!("Requesting password reset link");
    let response = ctx
        .api
        .post_public::<_, MessageResponse>("/forgot-password", &request)
        .await?;
    Ok(response
        .data
        .message
        .unwrap_or_else(|| "If this email exists, you will receive a password reset link".into()))
}

/// Set a new password from a reset link. The user logs in afterwards.
pub async fn reset_password(
    ctx: &ClientContext,
    token: &str,
    password: &str,
    confirm_password: &str,
) -> Result<String> {
    let token = token.trim();
    if token.is_empty() || token.contains('/') {
        return Err(ClientError::Validation("Invalid reset link".into()));
    }
    let request = ResetPasswordForm {
        password: password.to_string(),
        confirm_password: confirm_password.to_string(),
    }
    .validate()?;

    let response = ctx
        .api
        .post_public::<_, MessageResponse>(&format!("/reset-password/{token}"), &request)
        .await?;
    Ok(response
        .data
        .message
        .unwrap_or_else(|| "Password reset successfully".into()))
}

/// Submit the profile edit form and refresh the session's profile in place.
pub async fn update_profile(ctx: &ClientContext, form: ProfileForm) -> Result<Profile> {
    let current = ctx.session.profile().ok_or(ClientError::NotAuthenticated)?;
    let request = form.validate(&current)?;

    info!(user_id = %current.id, "Updating profile");
    let response = ctx
        .api
        .put::<_, Profile>("/user/profile", &request)
        .await?;
    adopt_profile(ctx, response.issued_under, response.data)
}

/// Re-read the logged-in user from the backend.
pub async fn fetch_current_user(ctx: &ClientContext) -> Result<Profile> {
    if !ctx.session.is_authenticated() {
        return Err(ClientError::NotAuthenticated);
    }
    let response = ctx.api.get::<Profile>("/user/me").await?;
    adopt_profile(ctx, response.issued_under, response.data)
}

pub fn logout(ctx: &ClientContext) -> Result<()> {
    let was_authenticated = ctx.session.is_authenticated();
    ctx.session.clear()?;
    if was_authenticated {
        info!("Logged out");
        ctx.events.emit(ClientEvent::SessionEnded {
            reason: SessionEndReason::Logout,
        });
    }
    Ok(())
}

fn start_session(ctx: &ClientContext, auth: AuthResponse) -> Result<Profile> {
    if auth.token.is_empty() {
        return Err(ClientError::Decode("sign-in response carried no token".into()));
    }
    let profile = auth.user.clone();
    ctx.session.commit(Session::new(auth.token, auth.user))?;
    ctx.events.emit(ClientEvent::SessionStarted {
        user_id: profile.id,
    });
    Ok(profile)
}

/// Install `profile` unless the session that requested it has since ended.
fn adopt_profile(ctx: &ClientContext, issued_under: Option<SessionId>, profile: Profile) -> Result<Profile> {
    let result = match issued_under {
        Some(id) => ctx.session.refresh_profile(id, profile.clone()),
        None => Err(ClientError::NotAuthenticated),
    };
    if let Err(ClientError::NotAuthenticated) = result {
        warn!("Session changed while the profile request was in flight");
    }
    result.map(|()| profile)
}
