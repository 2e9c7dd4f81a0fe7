//! Configuration management for the Kiosk MCP server.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure a usable authentication shape is present.

use crate::error::KioskError;
use std::env;
use url::Url;

/// How requests are authenticated against Jira.
///
/// Both shapes use HTTP Basic authentication. A personal token is sent
/// with an empty username.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Cloud-style username (email) plus API token.
    BasicToken {
        /// Account username or email.
        username: String,
        /// API token. Never logged.
        token: String,
    },
    /// Data Center personal access token.
    PersonalToken {
        /// The personal token. Never logged.
        token: String,
    },
}

impl AuthMode {
    /// Resolves the authentication shape from its optional parts.
    ///
    /// A complete username/API token pair takes precedence over a personal
    /// token. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if neither shape is complete.
    pub fn resolve(
        username: Option<String>,
        api_token: Option<String>,
        personal_token: Option<String>,
    ) -> Result<Self, KioskError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        match (present(username), present(api_token), present(personal_token)) {
            (Some(username), Some(token), _) => Ok(AuthMode::BasicToken { username, token }),
            (_, _, Some(token)) => Ok(AuthMode::PersonalToken { token }),
            _ => Err(KioskError::invalid_config(
                "no valid authentication method found: set JIRA_USERNAME and JIRA_API_TOKEN, \
                 or JIRA_PERSONAL_TOKEN",
            )),
        }
    }

    /// Returns the (username, password) pair used for HTTP Basic auth.
    pub fn basic_credentials(&self) -> (&str, &str) {
        match self {
            AuthMode::BasicToken { username, token } => (username, token),
            AuthMode::PersonalToken { token } => ("", token),
        }
    }

    /// Returns the secret part, for error message sanitization only.
    pub(crate) fn secret(&self) -> &str {
        self.basic_credentials().1
    }

    /// Short name of the mode, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthMode::BasicToken { .. } => "basic_token",
            AuthMode::PersonalToken { .. } => "personal_token",
        }
    }
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::BasicToken { username, .. } => f
                .debug_struct("BasicToken")
                .field("username", username)
                .field("token", &"[REDACTED]")
                .finish(),
            AuthMode::PersonalToken { .. } => f
                .debug_struct("PersonalToken")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Configuration for connecting to Jira Service Management.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Jira site (e.g., `https://example.atlassian.net`), no trailing slash.
    pub base_url: String,

    /// Resolved authentication shape.
    pub auth: AuthMode,

    /// Service desk used when a tool call omits `service_desk_id`.
    pub default_service_desk_id: Option<String>,

    /// When true, write tools refuse to run.
    pub read_only: bool,

    /// Whether TLS certificates are verified.
    pub ssl_verify: bool,
}

impl Config {
    /// Creates a configuration with defaults for the optional settings.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if the base URL is invalid.
    pub fn new(base_url: impl Into<String>, auth: AuthMode) -> Result<Self, KioskError> {
        Ok(Config {
            base_url: Self::validate_base_url(base_url.into())?,
            auth,
            default_service_desk_id: None,
            read_only: false,
            ssl_verify: true,
        })
    }

    /// Sets the default service desk ID.
    pub fn with_default_service_desk_id(mut self, id: impl Into<String>) -> Self {
        self.default_service_desk_id = Some(id.into());
        self
    }

    /// Enables or disables read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JIRA_URL` (required)
    /// - `JIRA_USERNAME` and `JIRA_API_TOKEN`, or `JIRA_PERSONAL_TOKEN`
    /// - `JIRA_DEFAULT_SERVICE_DESK_ID` (optional)
    /// - `READ_ONLY_MODE` (optional, default false)
    /// - `JIRA_SSL_VERIFY` (optional, default true)
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Config` if any required variable is missing
    /// or if values fail validation.
    pub fn from_env() -> Result<Self, KioskError> {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Loads configuration through a variable lookup function.
    fn from_source<F>(lookup: F) -> Result<Self, KioskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = get("JIRA_URL").ok_or_else(|| KioskError::missing_env("JIRA_URL"))?;
        let auth = AuthMode::resolve(
            get("JIRA_USERNAME"),
            get("JIRA_API_TOKEN"),
            get("JIRA_PERSONAL_TOKEN"),
        )?;
        Self::validate_token(auth.secret())?;

        let mut config = Config::new(base_url, auth)?;
        config.default_service_desk_id = get("JIRA_DEFAULT_SERVICE_DESK_ID");
        config.read_only = Self::parse_flag("READ_ONLY_MODE", get("READ_ONLY_MODE"), false)?;
        config.ssl_verify = Self::parse_flag("JIRA_SSL_VERIFY", get("JIRA_SSL_VERIFY"), true)?;

        Ok(config)
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, KioskError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(KioskError::invalid_config(
                "JIRA_URL must start with http:// or https://",
            ));
        }

        Url::parse(&url)
            .map_err(|e| KioskError::invalid_config(format!("JIRA_URL is not a valid URL: {}", e)))?;

        Ok(url)
    }

    /// Validates the token is not a placeholder value.
    fn validate_token(token: &str) -> Result<(), KioskError> {
        let token_lower = token.to_lowercase();
        let placeholder_patterns = ["your_api_token", "your_token", "placeholder", "changeme"];

        for pattern in placeholder_patterns {
            if token_lower.contains(pattern) {
                return Err(KioskError::invalid_config(
                    "Jira token appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }

    /// Parses a boolean flag, falling back to `default` when unset.
    fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool, KioskError> {
        let Some(value) = value else {
            return Ok(default);
        };
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(KioskError::invalid_config(format!(
                "{} must be a boolean (true/false), got {:?}",
                name, value
            ))),
        }
    }
}
