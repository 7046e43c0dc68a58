use std::fs;
use std::path::Path;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use url::Url;

pub static CONFIG: OnceCell<Config> = OnceCell::new();

/// Environment variables with this prefix override the config file.
/// Nested keys are separated by a double underscore, for example
/// `ENDPOINT_HOSTS_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "ENDPOINT_HOSTS_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub endpoint_hosts: String,
    pub reqwest: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const ENDPOINT_HOSTS_LEVEL: &str = "info";
    const REQWEST_LEVEL: &str = "error";

    fn default() -> Self {
        LoggingConfig {
            endpoint_hosts: Self::ENDPOINT_HOSTS_LEVEL.to_string(),
            reqwest: Self::REQWEST_LEVEL.to_string(),
        }
    }

    fn ensure_level(name: &str, level: &mut String, default: &str) {
        let original = level.clone();
        *level = level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&level.as_str()) {
            eprintln!(
                "Config error: {} log level of '{}' is invalid - using default of '{}'",
                name, original, default
            );
            *level = default.to_owned();
        }
    }

    fn ensure_valid(&mut self) {
        Self::ensure_level(
            "endpoint_hosts",
            &mut self.endpoint_hosts,
            Self::ENDPOINT_HOSTS_LEVEL,
        );
        Self::ensure_level("reqwest", &mut self.reqwest, Self::REQWEST_LEVEL);
    }

    /// Log specification understood by flexi_logger
    pub fn log_spec(&self) -> String {
        format!(
            "warn, endpoint_hosts={}, reqwest={}",
            self.endpoint_hosts, self.reqwest
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    const DEFAULT_HOST: &str = "127.0.0.1";
    const DEFAULT_PORT: u16 = 5601;

    fn default() -> Self {
        ServerConfig {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }

    fn ensure_valid(&mut self) {
        self.host = self.host.trim().to_string();
        if self.host.is_empty() {
            eprintln!(
                "Config error: server host is empty - using default of '{}'",
                Self::DEFAULT_HOST
            );
            self.host = Self::DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            eprintln!(
                "Config error: server port 0 is invalid - using default of '{}'",
                Self::DEFAULT_PORT
            );
            self.port = Self::DEFAULT_PORT;
        }
    }
}

/// Where the search backend lives and which indices the routes read
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub url: String,
    pub hosts_index: String,
    pub metadata_index: String,
    pub policy_response_index: String,
    pub timeout_secs: u64,
}

impl SearchConfig {
    const DEFAULT_URL: &str = "http://127.0.0.1:9200";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    fn default() -> Self {
        SearchConfig {
            url: Self::DEFAULT_URL.to_string(),
            hosts_index: "endgame-hosts-full".to_string(),
            metadata_index: crate::types::METADATA_INDEX_PATTERN.to_string(),
            policy_response_index: "metrics-endpoint.policy-*".to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn ensure_valid(&mut self) {
        ensure_url("search", &mut self.url, Self::DEFAULT_URL);
        ensure_timeout("search", &mut self.timeout_secs, Self::DEFAULT_TIMEOUT_SECS);
    }
}

/// How the `hosts` command reaches the API server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5601";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    fn default() -> Self {
        ClientConfig {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn ensure_valid(&mut self) {
        ensure_url("client", &mut self.base_url, Self::DEFAULT_BASE_URL);
        ensure_timeout("client", &mut self.timeout_secs, Self::DEFAULT_TIMEOUT_SECS);
    }
}

fn ensure_url(section: &str, url: &mut String, default: &str) {
    let trimmed = url.trim().to_string();
    match Url::parse(&trimmed) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => *url = trimmed,
        _ => {
            eprintln!(
                "Config error: {} url of '{}' is invalid - using default of '{}'",
                section, url, default
            );
            *url = default.to_string();
        }
    }
}

fn ensure_timeout(section: &str, timeout_secs: &mut u64, default: u64) {
    if *timeout_secs == 0 {
        eprintln!(
            "Config error: {} timeout of 0 seconds is invalid - using default of '{}'",
            section, default
        );
        *timeout_secs = default;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub client: ClientConfig,
}

impl Config {
    pub fn default_config() -> Self {
        Config {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            client: ClientConfig::default(),
        }
    }

    /// Loads the configuration from a TOML file located in the app's data directory.
    /// If the file is missing or fails to parse, defaults are used.
    /// Additionally, writes the default config to disk if no file exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Self::default_config();

        if !config_path.exists() {
            Self::write_default(config_path, &default_config);
        }

        // Defaults, then the TOML file, then environment overrides
        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn write_default(config_path: &Path, default_config: &Config) {
        if let Some(parent) = config_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!(
                    "Failed to create configuration directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }
        match toml::to_string_pretty(default_config) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            }
            Err(_) => eprintln!("Failed to serialize default config."),
        }
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.server.ensure_valid();
        self.search.ensure_valid();
        self.client.ensure_valid();
    }
}
