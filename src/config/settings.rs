use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

const MAX_PER_PAGE: u32 = 100;

/// Longest session lifetime accepted from configuration (ten years)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Task list settings
    pub tasks: TaskListConfig,
    /// Login session settings
    pub session: SessionConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Set the `Secure` attribute on cookies.
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskListConfig {
    pub per_page: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            tasks: TaskListConfig { per_page: 5 },
            session: SessionConfig { ttl_hours: 24 * 7 },
            log: LogConfig {
                filter: "taskdesk=info,tower_http=info".to_string(),
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secure_cookies: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlTaskListConfig {
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlSessionConfig {
    pub ttl_hours: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlLogConfig {
    pub filter: Option<String>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub server: Option<TomlServerConfig>,
    pub tasks: Option<TomlTaskListConfig>,
    pub session: Option<TomlSessionConfig>,
    pub log: Option<TomlLogConfig>,
}

impl Config {
    /// Load configuration from the data directory, falling back to defaults.
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from an explicit file.
    ///
    /// A missing or malformed file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No config file loaded");
                return Config::default();
            }
        };

        match toml::from_str::<TomlConfig>(&contents) {
            Ok(toml_config) => Config::default().merged(toml_config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config file, using defaults"
                );
                Config::default()
            }
        }
    }

    /// Apply values present in the TOML file on top of `self`.
    fn merged(mut self, toml_config: TomlConfig) -> Self {
        if let Some(server) = toml_config.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(secure) = server.secure_cookies {
                self.server.secure_cookies = secure;
            }
        }

        if let Some(per_page) = toml_config.tasks.and_then(|t| t.per_page) {
            self.tasks.per_page = per_page.clamp(1, MAX_PER_PAGE);
        }

        if let Some(ttl) = toml_config.session.and_then(|s| s.ttl_hours) {
            if ttl <= 0 {
                tracing::warn!(ttl_hours = ttl, "Ignoring non-positive session ttl");
            } else if ttl > MAX_SESSION_TTL_HOURS {
                tracing::warn!(
                    ttl_hours = ttl,
                    max = MAX_SESSION_TTL_HOURS,
                    "Session ttl too long, using the maximum"
                );
                self.session.ttl_hours = MAX_SESSION_TTL_HOURS;
            } else {
                self.session.ttl_hours = ttl;
            }
        }

        if let Some(filter) = toml_config.log.and_then(|l| l.filter) {
            self.log.filter = filter;
        }

        self
    }

    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.tasks.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }
}
