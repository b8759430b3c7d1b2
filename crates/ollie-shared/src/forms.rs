//! Client-side form validation.
//!
//! Each form turns into its wire request only after validation succeeds, so
//! malformed input never reaches the backend.

use crate::constants::MIN_PASSWORD_LEN;
use crate::error::ValidationError;
use crate::protocol::{
    ForgotPasswordRequest, LoginRequest, ProfileUpdateRequest, RegisterRequest,
    ResetPasswordRequest,
};
use crate::types::Profile;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<LoginRequest, ValidationError> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(ValidationError::MissingField("Email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("Password"));
        }
        Ok(LoginRequest {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub region: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(self) -> Result<RegisterRequest, ValidationError> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(ValidationError::MissingField("Email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(ValidationError::MissingField("Username"));
        }
        let region = self.region.trim().to_string();
        if region.is_empty() {
            return Err(ValidationError::MissingField("Region"));
        }
        check_new_password(&self.password, &self.confirm_password)?;
        Ok(RegisterRequest {
            email,
            username,
            region,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(self) -> Result<ForgotPasswordRequest, ValidationError> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(ValidationError::MissingField("Email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(ForgotPasswordRequest { email })
    }
}

/// New password chosen from a reset link.
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(self) -> Result<ResetPasswordRequest, ValidationError> {
        check_new_password(&self.password, &self.confirm_password)?;
        Ok(ResetPasswordRequest {
            password: self.password,
        })
    }
}

fn check_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Profile edit form.
///
/// Password-based accounts re-authenticate with `current_password`; accounts
/// linked to Google re-authenticate with a fresh Google ID token instead and
/// never send password fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub username: String,
    pub region: Option<String>,
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
    pub google_token: Option<String>,
}

impl ProfileForm {
    /// Pre-fill from the profile being edited.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            region: profile.region.clone(),
            ..Default::default()
        }
    }

    pub fn validate(self, profile: &Profile) -> Result<ProfileUpdateRequest, ValidationError> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(ValidationError::MissingField("Username"));
        }

        if profile.google_linked {
            return Ok(ProfileUpdateRequest {
                username,
                region: self.region,
                current_password: None,
                new_password: None,
                google_token: self.google_token,
            });
        }

        if !self.new_password.is_empty() && self.new_password != self.confirm_new_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.current_password.is_empty() {
            return Err(ValidationError::CurrentPasswordRequired);
        }

        Ok(ProfileUpdateRequest {
            username,
            region: self.region,
            current_password: Some(self.current_password),
            new_password: Some(self.new_password).filter(|p| !p.is_empty()),
            google_token: None,
        })
    }
}
