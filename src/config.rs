//! Loading and validating `~/.bouncer.json`.
//!
//! The file is read once at startup into an immutable [`Config`]; every
//! component borrows the part it needs. Pattern strings are compiled here so
//! a malformed pattern fails the run before any network traffic happens.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE: &str = ".bouncer.json";

/// Lowest port accepted for the MUSH endpoint.
pub const MIN_PORT: i64 = 1024;
/// Highest port accepted for the MUSH endpoint.
pub const MAX_PORT: i64 = 65535;

/// Default wait after logging in before any further command is sent.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
/// Default pause after each finger command.
pub const DEFAULT_QUERY_PACING_MS: u64 = 100;
/// Default read timeout for one iteration of the socket drain loop.
pub const DEFAULT_READ_POLL_MS: u64 = 100;
/// Default number of wiki pages fetched per batch.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern in `{key}`: {source}")]
    Pattern {
        key: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("invalid port number {0} (must be {MIN_PORT}-{MAX_PORT})")]
    Port(i64),

    #[error("fetch_concurrency must be at least 1")]
    Concurrency,
}

/// The on-disk shape of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub host: String,
    pub port: i64,
    pub login: String,
    pub password: String,
    #[serde(rename = "wiki_base")]
    pub wiki: String,
    pub active_character_page: String,
    #[serde(rename = "active_character_regex")]
    pub active_character: String,
    #[serde(rename = "on_mush_as_regex")]
    pub on_mush_as: String,
    #[serde(rename = "finger_regex")]
    pub finger: String,
    #[serde(rename = "recent_login_regex")]
    pub recent_login: String,
    pub on_connect: String,
    pub on_disconnect: String,
    pub finger_command: String,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_query_pacing_ms")]
    pub query_pacing_ms: u64,
    #[serde(default = "default_read_poll_ms")]
    pub read_poll_ms: u64,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_query_pacing_ms() -> u64 {
    DEFAULT_QUERY_PACING_MS
}

fn default_read_poll_ms() -> u64 {
    DEFAULT_READ_POLL_MS
}

fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

/// Validated, compiled configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub wiki: WikiConfig,
    pub activity: ActivityPatterns,
    pub timing: Timing,
}

/// Where the MUSH lives and what to say to it.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    /// Sent once after the login settles.
    pub on_connect: String,
    /// Sent before `QUIT` when the session closes.
    pub on_disconnect: String,
    /// Verb prefixed to each name, e.g. `+finger`.
    pub finger_command: String,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("on_connect", &self.on_connect)
            .field("on_disconnect", &self.on_disconnect)
            .field("finger_command", &self.finger_command)
            .finish()
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the roster comes from.
#[derive(Debug, Clone)]
pub struct WikiConfig {
    /// Prefix for the index page and every extracted link.
    pub base: String,
    pub active_character_page: String,
    /// Capture group 1 is a page link relative to `base`.
    pub active_character: Regex,
    /// Capture group 1 is the character's name on the MUSH.
    pub on_mush_as: Regex,
}

impl WikiConfig {
    pub fn index_url(&self) -> String {
        format!("{}{}", self.base, self.active_character_page)
    }
}

/// Patterns the correlator applies to the session transcript.
#[derive(Debug, Clone)]
pub struct ActivityPatterns {
    /// Matches a finger result line; capture group 1 is the name.
    pub finger: Regex,
    /// Matches the line right after a finger result when the login was recent.
    pub recent_login: Regex,
}

/// Protocol pacing and crawl fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle_delay: Duration,
    pub query_pacing: Duration,
    pub read_poll: Duration,
    pub fetch_concurrency: usize,
    pub http_timeout: Option<Duration>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            query_pacing: Duration::from_millis(DEFAULT_QUERY_PACING_MS),
            read_poll: Duration::from_millis(DEFAULT_READ_POLL_MS),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            http_timeout: None,
        }
    }
}

impl Config {
    /// `~/.bouncer.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.port < MIN_PORT || raw.port > MAX_PORT {
            return Err(ConfigError::Port(raw.port));
        }
        if raw.fetch_concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }

        let server = ServerConfig {
            host: raw.host.trim().to_string(),
            // Range checked above.
            port: raw.port as u16,
            login: raw.login.trim().to_string(),
            password: raw.password.trim().to_string(),
            on_connect: raw.on_connect.trim().to_string(),
            on_disconnect: raw.on_disconnect.trim().to_string(),
            finger_command: raw.finger_command.trim().to_string(),
        };

        let wiki = WikiConfig {
            base: raw.wiki.trim().to_string(),
            active_character_page: raw.active_character_page.trim().to_string(),
            active_character: compile("active_character_regex", &raw.active_character)?,
            on_mush_as: compile("on_mush_as_regex", raw.on_mush_as.trim())?,
        };

        let activity = ActivityPatterns {
            finger: compile("finger_regex", &raw.finger)?,
            recent_login: compile("recent_login_regex", &raw.recent_login)?,
        };

        let timing = Timing {
            settle_delay: Duration::from_millis(raw.settle_delay_ms),
            query_pacing: Duration::from_millis(raw.query_pacing_ms),
            read_poll: Duration::from_millis(raw.read_poll_ms),
            fetch_concurrency: raw.fetch_concurrency,
            http_timeout: raw.http_timeout_secs.map(Duration::from_secs),
        };

        Ok(Self {
            server,
            wiki,
            activity,
            timing,
        })
    }
}

fn compile(key: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern { key, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw_json() -> serde_json::Value {
        serde_json::json!({
            "host": " mush.example.org ",
            "port": 4201,
            "login": "Bouncer",
            "password": " hunter2\n",
            "wiki_base": "https://wiki.example.org",
            "active_character_page": "/wiki/Active_Characters",
            "active_character_regex": "<a href=\"(/wiki/[^\"]+)\"",
            "on_mush_as_regex": "On MUSH as: (\\w+)",
            "finger_regex": "^(\\w+) is here",
            "recent_login_regex": "Last login: \\d+ minutes? ago",
            "on_connect": "@set me=quiet",
            "on_disconnect": "@set me=!quiet",
            "finger_command": "+finger"
        })
    }

    fn parse(value: serde_json::Value) -> Result<Config, ConfigError> {
        Config::from_raw(serde_json::from_value(value).expect("raw config should deserialize"))
    }

    #[test]
    fn test_trims_strings_and_applies_timing_defaults() {
        let config = parse(raw_json()).expect("valid config");

        assert_eq!(config.server.host, "mush.example.org");
        assert_eq!(config.server.password, "hunter2");
        assert_eq!(config.server.port, 4201);
        assert_eq!(config.server.address(), "mush.example.org:4201");
        assert_eq!(
            config.wiki.index_url(),
            "https://wiki.example.org/wiki/Active_Characters"
        );
        assert_eq!(config.timing, Timing::default());
    }

    #[test]
    fn test_timing_overrides() {
        let mut value = raw_json();
        value["settle_delay_ms"] = 250.into();
        value["query_pacing_ms"] = 5.into();
        value["read_poll_ms"] = 20.into();
        value["fetch_concurrency"] = 3.into();
        value["http_timeout_secs"] = 30.into();

        let timing = parse(value).expect("valid config").timing;

        assert_eq!(timing.settle_delay, Duration::from_millis(250));
        assert_eq!(timing.query_pacing, Duration::from_millis(5));
        assert_eq!(timing.read_poll, Duration::from_millis(20));
        assert_eq!(timing.fetch_concurrency, 3);
        assert_eq!(timing.http_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_ports_outside_range() {
        for port in [0_i64, 80, 1023, 65536] {
            let mut value = raw_json();
            value["port"] = port.into();
            assert!(matches!(parse(value), Err(ConfigError::Port(p)) if p == port));
        }

        for port in [1024_i64, 65535] {
            let mut value = raw_json();
            value["port"] = port.into();
            assert!(parse(value).is_ok());
        }
    }

    #[test]
    fn test_bad_pattern_names_its_key() {
        let mut value = raw_json();
        value["finger_regex"] = "(unclosed".into();

        let err = parse(value).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { key: "finger_regex", .. }));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let mut value = raw_json();
        value["fetch_concurrency"] = 0.into();
        assert!(matches!(parse(value), Err(ConfigError::Concurrency)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = parse(raw_json()).expect("valid config");
        let debug = format!("{:?}", config.server);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{}", raw_json()).expect("write config");

        let config = Config::load(file.path()).expect("load config");
        assert_eq!(config.server.finger_command, "+finger");
    }

    #[test]
    fn test_load_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Read { .. })
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{ not json").expect("write garbage");
        assert!(matches!(
            Config::load(&garbage),
            Err(ConfigError::Parse { .. })
        ));
    }
}
