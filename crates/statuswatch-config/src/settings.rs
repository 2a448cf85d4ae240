//! Environment-sourced runtime settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use lettre::message::Mailbox;
use lettre::Address;

use crate::error::ConfigError;
use crate::validator::ValidationError;

/// Environment variable names.
pub mod keys {
    pub const EMAIL_SENDER: &str = "EMAIL_SENDER";
    pub const EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
    pub const EMAIL_RECEIVERS: &str = "EMAIL_RECEIVERS";
    pub const SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
    pub const CHECK_DELAY: &str = "CHECK_DELAY_BETWEEN_SITES";
    pub const LOOP_DELAY: &str = "LOOP_DELAY";
    pub const SMTP_HOST: &str = "SMTP_HOST";
    pub const SMTP_PORT: &str = "SMTP_PORT";
    pub const FETCH_BACKEND: &str = "FETCH_BACKEND";
    pub const FETCH_TIMEOUT: &str = "FETCH_TIMEOUT_SECS";
    pub const BROWSER_ENDPOINT: &str = "BROWSER_ENDPOINT";
    pub const RENDER_WAIT_MIN: &str = "RENDER_WAIT_MIN_SECS";
    pub const RENDER_WAIT_MAX: &str = "RENDER_WAIT_MAX_SECS";
}

pub const DEFAULT_CHECK_DELAY_SECS: u64 = 10;
pub const DEFAULT_LOOP_DELAY_SECS: u64 = 60;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_BROWSER_ENDPOINT: &str = "http://127.0.0.1:9222";
pub const DEFAULT_RENDER_WAIT_MIN_SECS: u64 = 5;
pub const DEFAULT_RENDER_WAIT_MAX_SECS: u64 = 8;

/// Complete runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub email: EmailSettings,
    /// Chat webhook destination; `None` disables the channel.
    pub chat_webhook_url: Option<String>,
    pub schedule: ScheduleSettings,
    pub fetch: FetchSettings,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// Every missing or malformed value is collected before failing, so a
    /// single run reports all of them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = EnvReader::new(&lookup);
        let mut errors = Vec::new();

        let email = EmailSettings::read(&reader, &mut errors);
        let chat_webhook_url = read_webhook_url(&reader, &mut errors);
        let schedule = ScheduleSettings::read(&reader, &mut errors);
        let fetch = FetchSettings::read(&reader, &mut errors);

        match email {
            Some(email) if errors.is_empty() => Ok(Self {
                email,
                chat_webhook_url,
                schedule,
                fetch,
            }),
            _ => Err(ConfigError::Invalid(errors)),
        }
    }

    /// Whether the chat webhook channel is enabled.
    pub fn chat_enabled(&self) -> bool {
        self.chat_webhook_url.is_some()
    }
}

/// Credentials and routing for the email channel.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailSettings {
    /// From-address, also used as the SMTP login.
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl EmailSettings {
    fn read(reader: &EnvReader<'_>, errors: &mut Vec<ValidationError>) -> Option<Self> {
        let sender = reader.required(keys::EMAIL_SENDER, "is not set", errors);
        if let Some(sender) = &sender {
            // Also the SMTP login, so a bare address is required.
            check_address::<Address>(keys::EMAIL_SENDER, sender, errors);
        }

        let password = reader.get_raw(keys::EMAIL_PASSWORD);
        if password.is_none() {
            errors.push(ValidationError::new(keys::EMAIL_PASSWORD, "is not set"));
        }

        let recipients = parse_recipients(reader.get(keys::EMAIL_RECEIVERS).as_deref());
        if recipients.is_empty() {
            errors.push(ValidationError::new(
                keys::EMAIL_RECEIVERS,
                "is not set or empty",
            ));
        }
        for address in &recipients {
            check_address::<Mailbox>(keys::EMAIL_RECEIVERS, address, errors);
        }

        let smtp_host = reader
            .get(keys::SMTP_HOST)
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = reader.parsed(keys::SMTP_PORT, DEFAULT_SMTP_PORT, errors);

        Some(Self {
            sender: sender?,
            password: password?,
            recipients,
            smtp_host,
            smtp_port,
        })
    }
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients.len())
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

/// Delays that pace the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Pause after each target check.
    pub check_delay: Duration,
    /// Pause after each full cycle.
    pub loop_delay: Duration,
}

impl ScheduleSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = EnvReader::new(&lookup);
        let mut errors = Vec::new();
        let settings = Self::read(&reader, &mut errors);
        if errors.is_empty() {
            Ok(settings)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    fn read(reader: &EnvReader<'_>, errors: &mut Vec<ValidationError>) -> Self {
        Self {
            check_delay: reader.seconds(keys::CHECK_DELAY, DEFAULT_CHECK_DELAY_SECS, errors),
            loop_delay: reader.seconds(keys::LOOP_DELAY, DEFAULT_LOOP_DELAY_SECS, errors),
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            check_delay: Duration::from_secs(DEFAULT_CHECK_DELAY_SECS),
            loop_delay: Duration::from_secs(DEFAULT_LOOP_DELAY_SECS),
        }
    }
}

/// Page fetching backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchBackend {
    /// Chrome over the DevTools protocol; renders client-side JavaScript.
    #[default]
    Browser,
    /// Plain HTTP GET.
    Http,
}

impl FromStr for FetchBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" | "chrome" | "cdp" => Ok(FetchBackend::Browser),
            "http" => Ok(FetchBackend::Http),
            other => Err(format!(
                "unknown backend '{}', expected 'browser' or 'http'",
                other
            )),
        }
    }
}

impl fmt::Display for FetchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchBackend::Browser => write!(f, "browser"),
            FetchBackend::Http => write!(f, "http"),
        }
    }
}

/// Page fetcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub backend: FetchBackend,
    /// Wall-clock limit for one fetch, render wait included.
    pub timeout: Duration,
    /// Chrome remote-debugging HTTP endpoint.
    pub browser_endpoint: String,
    pub render_wait_min: Duration,
    pub render_wait_max: Duration,
}

impl FetchSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reader = EnvReader::new(&lookup);
        let mut errors = Vec::new();
        let settings = Self::read(&reader, &mut errors);
        if errors.is_empty() {
            Ok(settings)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    fn read(reader: &EnvReader<'_>, errors: &mut Vec<ValidationError>) -> Self {
        let backend = match reader.get(keys::FETCH_BACKEND) {
            Some(raw) => raw.parse().unwrap_or_else(|message: String| {
                errors.push(ValidationError::new(keys::FETCH_BACKEND, message));
                FetchBackend::default()
            }),
            None => FetchBackend::default(),
        };

        let timeout = reader.seconds(keys::FETCH_TIMEOUT, DEFAULT_FETCH_TIMEOUT_SECS, errors);
        if timeout.is_zero() {
            errors.push(ValidationError::new(
                keys::FETCH_TIMEOUT,
                "must be greater than 0",
            ));
        }

        let browser_endpoint = reader
            .get(keys::BROWSER_ENDPOINT)
            .unwrap_or_else(|| DEFAULT_BROWSER_ENDPOINT.to_string());
        if url::Url::parse(&browser_endpoint).is_err() {
            errors.push(ValidationError::new(
                keys::BROWSER_ENDPOINT,
                format!("'{}' is not a valid URL", browser_endpoint),
            ));
        }

        let render_wait_min =
            reader.seconds(keys::RENDER_WAIT_MIN, DEFAULT_RENDER_WAIT_MIN_SECS, errors);
        let render_wait_max =
            reader.seconds(keys::RENDER_WAIT_MAX, DEFAULT_RENDER_WAIT_MAX_SECS, errors);
        if render_wait_min > render_wait_max {
            errors.push(ValidationError::new(
                keys::RENDER_WAIT_MIN,
                format!("must not exceed {}", keys::RENDER_WAIT_MAX),
            ));
        }

        Self {
            backend,
            timeout,
            browser_endpoint,
            render_wait_min,
            render_wait_max,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            backend: FetchBackend::default(),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            browser_endpoint: DEFAULT_BROWSER_ENDPOINT.to_string(),
            render_wait_min: Duration::from_secs(DEFAULT_RENDER_WAIT_MIN_SECS),
            render_wait_max: Duration::from_secs(DEFAULT_RENDER_WAIT_MAX_SECS),
        }
    }
}

/// Split a comma-separated recipient list, dropping blanks.
pub fn parse_recipients(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reject anything the mail transport would refuse at send time.
fn check_address<T: FromStr>(key: &str, address: &str, errors: &mut Vec<ValidationError>) {
    if address.parse::<T>().is_err() {
        errors.push(ValidationError::new(
            key,
            format!("'{}' is not an email address", address),
        ));
    }
}

fn read_webhook_url(reader: &EnvReader<'_>, errors: &mut Vec<ValidationError>) -> Option<String> {
    let raw = reader.get(keys::SLACK_WEBHOOK_URL)?;
    match url::Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(raw),
        _ => {
            errors.push(ValidationError::new(
                keys::SLACK_WEBHOOK_URL,
                format!("'{}' is not an http(s) URL", raw),
            ));
            None
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Lookup wrapper that treats blank values as unset.
struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvReader<'a> {
    fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.get_raw(key).map(|v| v.trim().to_string())
    }

    /// Value exactly as set, for secrets where whitespace is significant.
    fn get_raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(
        &self,
        key: &str,
        message: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Option<String> {
        let value = self.get(key);
        if value.is_none() {
            errors.push(ValidationError::new(key, message));
        }
        value
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T, errors: &mut Vec<ValidationError>) -> T {
        match self.get(key) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push(ValidationError::new(
                    key,
                    format!("'{}' is not a valid number", raw),
                ));
                default
            }),
            None => default,
        }
    }

    fn seconds(&self, key: &str, default: u64, errors: &mut Vec<ValidationError>) -> Duration {
        Duration::from_secs(self.parsed(key, default, errors))
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
