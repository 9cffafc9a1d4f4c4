/// Configuration default values
///
/// All defaults for configuration options live here so they can be changed
/// in one place.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/epg-collector.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Upstream API defaults
pub const DEFAULT_PLAYLIST_URL: &str = "https://pl.iptv2021.com/api/v4/playlist";
pub const DEFAULT_EPG_URL: &str = "https://pl.iptv2021.com/api/v4/epg";
pub const DEFAULT_UPSTREAM_TIMEOUT: &str = "30s";
pub const DEFAULT_UPSTREAM_HOST_HEADER: &str = "pl.iptv2021.com";
pub const DEFAULT_UPSTREAM_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; SM-A127F Build/RP1A.200720.012; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/137.0.7151.115 Mobile Safari/537.36";
pub const DEFAULT_UPSTREAM_AGENT_HEADER: &str = r#"{"platform":"android","app":"limehd.ru.lite","version_name":"4.3.4","version_code":"529","sdk":30,"name":"Samsung+Galaxy+A12","device_id":"4b1c781b1d127ee5","is_huawei":0}"#;

// EPG request window and locale
pub const DEFAULT_EPG_FROM: u32 = 0;
pub const DEFAULT_EPG_LIMIT: u32 = 100;
pub const DEFAULT_EPG_GROUPING: u32 = 1;
pub const DEFAULT_EPG_REGION: u32 = 77;
pub const DEFAULT_EPG_LANG: &str = "ru";

// Collection defaults
pub const DEFAULT_TIMEZONE_OFFSET: i32 = 3;
pub const DEFAULT_PACING_DELAY: &str = "100ms";
pub const DEFAULT_PLAYLIST_SCHEDULE: &str = "0 0 6 * * *";
pub const DEFAULT_EPG_SCHEDULE: &str = "0 0 */2 * * *";
pub const DEFAULT_RUN_ON_STARTUP: bool = true;

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Read API limits
pub const DEFAULT_PROGRAM_LIST_LIMIT: u64 = 50;
pub const MAX_PROGRAM_LIST_LIMIT: u64 = 1000;
