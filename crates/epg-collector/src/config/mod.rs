use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::utils::UrlUtils;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

/// Prefix for environment overrides, e.g. `EPG_COLLECTOR_WEB__PORT=9090`
pub const ENV_PREFIX: &str = "EPG_COLLECTOR_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub upstream: UpstreamConfig,
    pub collection: CollectionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream content API endpoints and request shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub playlist_url: String,
    pub epg_url: String,
    /// Per-request timeout applied by the HTTP client
    #[serde(with = "duration_serde::duration", default = "default_upstream_timeout")]
    pub timeout: Duration,
    /// Headers sent with every upstream request
    #[serde(default = "default_upstream_headers")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub epg_query: EpgQueryConfig,
}

/// Fixed EPG request parameters. These are constants for a deployment and are
/// never derived from the data being collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgQueryConfig {
    #[serde(default = "default_epg_from")]
    pub epg_from: u32,
    #[serde(default = "default_epg_limit")]
    pub epg_limit: u32,
    #[serde(default = "default_epg_grouping")]
    pub grouping: u32,
    #[serde(default = "default_epg_region")]
    pub region: u32,
    #[serde(default = "default_epg_lang")]
    pub lang: String,
}

/// How fetched programs are written against rows collected earlier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgramStrategy {
    /// Every collected program is inserted; repeated runs accumulate rows
    AppendOnly,
    /// Programs are matched on (channel, external id) and updated in place
    #[default]
    UpsertByExternalId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Timezone offset (hours) passed to the EPG endpoint by scheduled and bootstrap runs
    #[serde(default = "default_timezone_offset")]
    pub default_timezone: i32,
    /// Delay between consecutive per-channel EPG requests
    #[serde(with = "duration_serde::duration", default = "default_pacing_delay")]
    pub pacing_delay: Duration,
    #[serde(default)]
    pub program_strategy: ProgramStrategy,
    /// Cron expression (seconds first) for playlist collection
    #[serde(default = "default_playlist_schedule")]
    pub playlist_schedule: String,
    /// Cron expression (seconds first) for EPG collection across all channels
    #[serde(default = "default_epg_schedule")]
    pub epg_schedule: String,
    /// Run playlist then EPG collection once at startup
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_upstream_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_UPSTREAM_TIMEOUT).unwrap_or(Duration::from_secs(30))
}

fn default_upstream_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Host".to_string(), DEFAULT_UPSTREAM_HOST_HEADER.to_string()),
        ("User-Agent".to_string(), DEFAULT_UPSTREAM_USER_AGENT.to_string()),
        ("x-lhd-agent".to_string(), DEFAULT_UPSTREAM_AGENT_HEADER.to_string()),
    ])
}

fn default_epg_from() -> u32 {
    DEFAULT_EPG_FROM
}

fn default_epg_limit() -> u32 {
    DEFAULT_EPG_LIMIT
}

fn default_epg_grouping() -> u32 {
    DEFAULT_EPG_GROUPING
}

fn default_epg_region() -> u32 {
    DEFAULT_EPG_REGION
}

fn default_epg_lang() -> String {
    DEFAULT_EPG_LANG.to_string()
}

fn default_timezone_offset() -> i32 {
    DEFAULT_TIMEZONE_OFFSET
}

fn default_pacing_delay() -> Duration {
    humantime::parse_duration(DEFAULT_PACING_DELAY).unwrap_or(Duration::from_millis(100))
}

fn default_playlist_schedule() -> String {
    DEFAULT_PLAYLIST_SCHEDULE.to_string()
}

fn default_epg_schedule() -> String {
    DEFAULT_EPG_SCHEDULE.to_string()
}

fn default_run_on_startup() -> bool {
    DEFAULT_RUN_ON_STARTUP
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for EpgQueryConfig {
    fn default() -> Self {
        Self {
            epg_from: default_epg_from(),
            epg_limit: default_epg_limit(),
            grouping: default_epg_grouping(),
            region: default_epg_region(),
            lang: default_epg_lang(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            playlist_url: DEFAULT_PLAYLIST_URL.to_string(),
            epg_url: DEFAULT_EPG_URL.to_string(),
            timeout: default_upstream_timeout(),
            headers: default_upstream_headers(),
            epg_query: EpgQueryConfig::default(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone_offset(),
            pacing_delay: default_pacing_delay(),
            program_strategy: ProgramStrategy::default(),
            playlist_schedule: default_playlist_schedule(),
            epg_schedule: default_epg_schedule(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: Some(DEFAULT_MAX_CONNECTIONS),
            },
            web: WebConfig {
                host: default_host(),
                port: default_port(),
            },
            upstream: UpstreamConfig::default(),
            collection: CollectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Load configuration from defaults, the TOML file, then `EPG_COLLECTOR_*` env vars.
    ///
    /// A missing file is created with the defaults so operators have something to edit.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !std::path::Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)
                .with_context(|| format!("Failed to write default config file {config_file}"))?;
            info!("Created default config file: {}", config_file);
        }

        let config: Config = Self::figment(config_file)
            .extract()
            .with_context(|| format!("Failed to load configuration from {config_file}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Layered configuration sources, lowest precedence first
    pub fn figment(config_file: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject configurations that would only fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == Some(0) {
            anyhow::bail!("database.max_connections must be greater than zero");
        }
        if !UrlUtils::is_valid(&self.upstream.playlist_url) {
            anyhow::bail!("Invalid upstream.playlist_url '{}'", self.upstream.playlist_url);
        }
        if !UrlUtils::is_valid(&self.upstream.epg_url) {
            anyhow::bail!("Invalid upstream.epg_url '{}'", self.upstream.epg_url);
        }
        if self.upstream.epg_query.epg_limit == 0 {
            anyhow::bail!("upstream.epg_query.epg_limit must be greater than zero");
        }
        cron::Schedule::from_str(&self.collection.playlist_schedule).with_context(|| {
            format!(
                "Invalid collection.playlist_schedule '{}'",
                self.collection.playlist_schedule
            )
        })?;
        cron::Schedule::from_str(&self.collection.epg_schedule).with_context(|| {
            format!("Invalid collection.epg_schedule '{}'", self.collection.epg_schedule)
        })?;
        Ok(())
    }
}
