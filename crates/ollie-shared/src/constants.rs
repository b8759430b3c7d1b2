/// Application name
pub const APP_NAME: &str = "Ollie";

/// Storage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Storage key holding the JSON-serialized user profile
pub const USER_STORAGE_KEY: &str = "user";

/// Default REST backend base URL (local development backend)
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Route the UI navigates to when the credential is rejected
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;
