use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:8640";
const DEFAULT_CREDENTIAL: &str = "runtask";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between status polls while waiting for launched tasks to stop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

const ENV_ENDPOINT: &str = "RUNTASK_ENDPOINT";
const ENV_USER: &str = "RUNTASK_USER";
const ENV_PASSWORD: &str = "RUNTASK_PASSWORD";
const ENV_TIMEOUT_SECS: &str = "RUNTASK_TIMEOUT_SECS";
const ENV_POLL_MS: &str = "RUNTASK_POLL_MS";

/// Connection settings for the cluster-management service.
///
/// All instances must be constructed via [`ServiceConfig::builder`] or
/// [`ServiceConfig::from_env`] so invariants are validated before any
/// consumer observes the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    endpoint: String,
    user: String,
    password: String,
    request_timeout: Duration,
    poll_interval: Duration,
}

impl ServiceConfig {
    /// Returns a builder to incrementally construct and validate a configuration.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Reads the configuration from `RUNTASK_*` environment variables,
    /// falling back to local-service defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let endpoint = read_env_or_default(ENV_ENDPOINT, DEFAULT_ENDPOINT);
        let user = read_env_or_default(ENV_USER, DEFAULT_CREDENTIAL);
        let password = read_env_or_default(ENV_PASSWORD, DEFAULT_CREDENTIAL);
        let timeout_secs =
            parse_env_with_default::<u64>(ENV_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let poll_ms =
            parse_env_with_default::<u64>(ENV_POLL_MS, DEFAULT_POLL_INTERVAL.as_millis() as u64)?;

        Self::builder()
            .endpoint(endpoint)
            .user(user)
            .password(password)
            .request_timeout(Duration::from_secs(timeout_secs))
            .poll_interval(Duration::from_millis(poll_ms))
            .build()
    }

    /// Full service URL (including scheme).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Basic-auth username.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Basic-auth password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Per-call timeout applied to the JSON-RPC client.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Delay between successive describe rounds while waiting for tasks.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Performs validation on an existing configuration instance.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.endpoint)?;
        ensure_not_empty(&self.user, "user")?;
        ensure_not_empty(&self.password, "password")?;

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ServiceConfigBuilder {
    endpoint: Option<String>,
    user: Option<String>,
    password: Option<String>,
    request_timeout: Option<Duration>,
    poll_interval: Option<Duration>,
}

impl ServiceConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<ServiceConfig> {
        let config = ServiceConfig {
            endpoint: trimmed_string(self.endpoint.context("endpoint is required")?),
            user: trimmed_string(self.user.context("user is required")?),
            password: trimmed_string(self.password.context("password is required")?),
            request_timeout: self
                .request_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
        };

        config.validate()?;
        Ok(config)
    }
}

fn trimmed_string(value: String) -> String {
    value.trim().to_owned()
}

fn ensure_not_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} cannot be empty");
    }
    Ok(())
}

fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("endpoint must start with http:// or https://");
    }
    Ok(())
}

fn read_env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

fn parse_env_with_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("failed to parse {key}='{value}'")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("failed to read {key}")),
    }
}
