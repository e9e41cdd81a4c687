//! YAML server configuration.
//!
//! # Invariants
//! - `db.filename` is required; every other key has a default.
//! - Relative paths are resolved against the directory holding the config
//!   file, so the server behaves the same regardless of the working directory.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.prod.yaml";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_yaml::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config yaml: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    pub db: DbConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConfig {
    pub filename: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_stderr")]
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            stderr: default_log_stderr(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    clubgest_core::default_log_level().to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_stderr() -> bool {
    true
}

impl ServerConfig {
    /// Reads and validates the config at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let text = std::fs::read_to_string(path).map_err(io_error)?;
        let canonical = std::fs::canonicalize(path).map_err(io_error)?;
        let base_dir = canonical.parent().unwrap_or_else(|| Path::new("/"));
        Self::from_yaml_str(&text, base_dir)
    }

    /// Parses `text`, resolving relative paths against `base_dir`.
    pub fn from_yaml_str(text: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(text)?;
        config.db.filename = resolve(base_dir, &config.db.filename);
        config.log.dir = resolve(base_dir, &config.log.dir);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db.filename.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db.filename must not be empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "requestTimeoutMs must be greater than zero".into(),
            ));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "bindAddress `{}` is not an IP address",
                self.bind_address
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() || path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_keys() {
        let yaml = "db:\n  filename: club.sqlite3\n";
        let config =
            ServerConfig::from_yaml_str(yaml, Path::new("/srv/club")).expect("config should parse");

        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.db.filename, PathBuf::from("/srv/club/club.sqlite3"));
        assert_eq!(config.log.dir, PathBuf::from("/srv/club/logs"));
        assert!(config.log.stderr);
        assert_eq!(config.log.level, clubgest_core::default_log_level());
    }

    #[test]
    fn explicit_keys_override_defaults() {
        let yaml = r#"
bindAddress: 0.0.0.0
port: 9000
requestTimeoutMs: 250
db:
  filename: /var/lib/club.sqlite3
log:
  level: warn
  dir: var/log
  stderr: false
"#;
        let config = ServerConfig::from_yaml_str(yaml, Path::new("/etc/club")).expect("parse");

        assert_eq!(
            config.socket_addr().expect("addr"),
            "0.0.0.0:9000".parse().expect("literal addr")
        );
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.db.filename, PathBuf::from("/var/lib/club.sqlite3"));
        assert_eq!(config.log.dir, PathBuf::from("/etc/club/var/log"));
        assert_eq!(config.log.level, "warn");
        assert!(!config.log.stderr);
    }

    #[test]
    fn missing_db_filename_is_rejected() {
        let err = ServerConfig::from_yaml_str("port: 9000\n", Path::new("/"))
            .expect_err("db is required");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "db:\n  filename: a.db\nverbose: true\n";
        let err = ServerConfig::from_yaml_str(yaml, Path::new("/")).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_timeout_and_bad_address_are_invalid() {
        let zero = "requestTimeoutMs: 0\ndb:\n  filename: a.db\n";
        assert!(matches!(
            ServerConfig::from_yaml_str(zero, Path::new("/")),
            Err(ConfigError::Invalid(_))
        ));

        let host = "bindAddress: localhost\ndb:\n  filename: a.db\n";
        assert!(matches!(
            ServerConfig::from_yaml_str(host, Path::new("/")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn from_file_resolves_against_config_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "db:\n  filename: data/club.sqlite3\n").expect("write config");

        let config = ServerConfig::from_file(&path).expect("load config");
        let base = std::fs::canonicalize(dir.path()).expect("canonical dir");
        assert_eq!(config.db.filename, base.join("data/club.sqlite3"));
        assert!(config.log.dir.is_absolute());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ServerConfig::from_file(dir.path().join("absent.yaml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
