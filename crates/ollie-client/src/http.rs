//! Authenticated access to the REST backend.
//!
//! [`RequestAuthenticator`] is the only path to the backend. It attaches the
//! active credential to each request, tags the request with the session it was
//! issued under, and turns error statuses into [`ClientError`]s. A 401 for a
//! request that carried a credential ends that session and announces the
//! login redirect.

use std::sync::Arc;

use ollie_shared::protocol::ErrorBody;
use ollie_shared::{Credential, SessionId};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{ClientEvent, EventBus, SessionEndReason};
use crate::session::SessionStore;

/// A decoded success body plus the session its request was issued under.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub issued_under: Option<SessionId>,
    pub data: T,
}

#[derive(Debug, Clone)]
enum Credentials {
    /// Attach the active session's credential, if any.
    Session,
    /// Attach a credential captured earlier by the caller.
    Captured(SessionId, Credential),
    /// Never attach a credential (sign-in and registration endpoints).
    Omit,
}

pub struct RequestAuthenticator {
    http: reqwest::Client,
    base_url: String,
    login_path: String,
    session: Arc<SessionStore>,
    events: EventBus,
}

impl RequestAuthenticator {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>, events: EventBus) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            login_path: config.login_path.clone(),
            session,
            events,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.send::<(), T>(Method::GET, path, None, Credentials::Session)
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, body, Credentials::Session)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body), Credentials::Session)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.send::<(), T>(Method::DELETE, path, None, Credentials::Session)
            .await
    }

    /// POST under a credential the caller already read from the session.
    ///
    /// Lets a caller that decided to act while logged in send exactly that
    /// session's credential, even if the session changes before dispatch.
    pub async fn post_as<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        authorization: (SessionId, Credential),
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (id, credential) = authorization;
        self.send(Method::POST, path, body, Credentials::Captured(id, credential))
            .await
    }

    /// POST without a credential, for endpoints that establish one.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), Credentials::Omit)
            .await
    }

    /// GET without a credential.
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.send::<(), T>(Method::GET, path, None, Credentials::Omit)
            .await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        credentials: Credentials,
    ) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        let authorization = match credentials {
            Credentials::Session => self.session.authorization(),
            Credentials::Captured(id, credential) => Some((id, credential)),
            Credentials::Omit => None,
        };
        let issued_under = authorization.as_ref().map(|(id, _)| *id);
        if let Some((_, credential)) = &authorization {
            request = request.header(AUTHORIZATION, credential.bearer());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, authenticated = issued_under.is_some(), "dispatching request");

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            let data = decode_body(&bytes)?;
            return Ok(ApiResponse { issued_under, data });
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(status, &text);
        debug!(%method, path, status = status.as_u16(), %message, "request failed");
        Err(self.reject(status, message, issued_under))
    }

    fn reject(&self, status: StatusCode, message: String, issued_under: Option<SessionId>) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => match issued_under {
                Some(id) => {
                    self.on_credential_rejected(id);
                    ClientError::AuthenticationInvalid
                }
                None => ClientError::InvalidCredentials(message),
            },
            StatusCode::FORBIDDEN => ClientError::AuthorizationDenied(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            other => ClientError::Api {
                status: other.as_u16(),
                message,
            },
        }
    }

    fn on_credential_rejected(&self, id: SessionId) {
        if !self.session.invalidate(id) {
            debug!(session = %id, "credential rejected for a session that already ended");
            return;
        }
        warn!(session = %id, "credential rejected by backend, session cleared");
        self.events.emit(ClientEvent::SessionEnded {
            reason: SessionEndReason::CredentialRejected,
        });
        self.events.emit(ClientEvent::LoginRequired {
            redirect_to: self.login_path.clone(),
        });
    }
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(body) {
        return error;
    }
    let body = body.trim();
    if !body.is_empty() && body.len() <= 200 {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
