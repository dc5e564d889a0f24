//! Deployment target and credentials shared by every request of a client.
//!
//! A `Session` is an immutable value. Clients hold it behind an `Arc` and
//! each request keeps its own handle, so reconfiguring a client never
//! changes requests that were already created.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_ENVIRONMENT: &str = "LUCID_ENVIRONMENT";
pub const ENV_API_KEY: &str = "LUCID_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "LUCID_TIMEOUT_SECS";

/// Known deployment targets of the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Environment {
    Sandbox,
    #[default]
    Production,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Sandbox, Environment::Production];

    pub fn name(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => "https://stg-api.samplicio.us/",
            Environment::Production => "https://api.samplicio.us/",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.name() == s)
            .ok_or_else(|| ConfigError::UnknownEnvironment(s.to_string()))
    }
}

/// Where requests go and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    environment: Option<Environment>,
    api_key: String,
    timeout: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}

impl Session {
    pub fn new(environment: Environment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            environment: Some(environment),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Session pointed at an arbitrary base address, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            environment: None,
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a session from `LUCID_ENVIRONMENT`, `LUCID_API_KEY` and
    /// `LUCID_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(name) => name.parse()?,
            None => Environment::default(),
        };
        let api_key = lookup(ENV_API_KEY)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let mut session = Session::new(environment).api_key(api_key);
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            session = session.timeout(Duration::from_secs(secs));
        }
        Ok(session)
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.base_url = environment.base_url().to_string();
        self.environment = Some(environment);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `None` when the session targets a custom base address.
    pub fn current_environment(&self) -> Option<Environment> {
        self.environment
    }

    pub fn credential(&self) -> &str {
        &self.api_key
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }
}
