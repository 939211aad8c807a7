use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Human-readable service title, reported at startup
    #[arg(long, env = "VANISH_TITLE", default_value = "Vanish")]
    pub title: String,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub messages: MessageConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "VANISH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "VANISH_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management server (liveness/readiness probes)
    #[arg(long, env = "VANISH_MGMT_PORT", default_value_t = 3001)]
    pub mgmt_port: u16,

    /// Path prefix under which message retrieval URLs are exposed
    #[arg(long, env = "VANISH_ROOT_PATH", default_value = "/")]
    pub root_path: String,

    /// Timeout applied to every inbound request
    #[arg(long, env = "VANISH_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// How long to wait for background tasks during shutdown
    #[arg(long, env = "VANISH_SHUTDOWN_TIMEOUT_SECS", default_value_t = 20)]
    pub shutdown_timeout_secs: u64,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "VANISH_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Redis with native per-key expiry
    Redis,
    /// In-process map that emulates per-key expiry; contents die with the process
    Memory,
}

#[derive(Clone, Debug, Args)]
pub struct StoreConfig {
    /// Which backing store holds the message records
    #[arg(long, env = "VANISH_STORE_BACKEND", value_enum, default_value = "redis")]
    pub backend: StoreBackend,

    /// Redis connection URL
    #[arg(long, env = "VANISH_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Timeout for a single store operation
    #[arg(long, env = "VANISH_STORE_OP_TIMEOUT_SECS", default_value_t = 5)]
    pub op_timeout_secs: u64,

    /// How often the in-memory backend sweeps expired records
    #[arg(long, env = "VANISH_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Username required to post messages
    #[arg(long, env = "VANISH_USERNAME")]
    pub username: String,

    /// Password required to post messages
    #[arg(long, env = "VANISH_PASSWORD")]
    pub password: String,
}

#[derive(Clone, Debug, Args)]
pub struct MessageConfig {
    /// Character length of generated message identifiers
    #[arg(long, env = "VANISH_ID_LENGTH", default_value_t = 32)]
    pub id_length: usize,

    /// Minimum message length in characters, measured on raw input
    #[arg(long, env = "VANISH_MIN_LENGTH", default_value_t = 1)]
    pub min_length: usize,

    /// Maximum message length in characters, measured on raw input
    #[arg(long, env = "VANISH_MAX_LENGTH", default_value_t = 1000)]
    pub max_length: usize,

    /// Default validity window in seconds; must be strictly positive
    #[arg(long, env = "VANISH_VALIDITY_SECS", default_value_t = 86_400, value_parser = clap::value_parser!(i64).range(1..))]
    pub validity_secs: i64,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests per second allowed for message retrieval
    #[arg(long, env = "VANISH_RATE_LIMIT_PER_SECOND", default_value_t = 10)]
    pub per_second: u32,

    /// Burst allowance for message retrieval
    #[arg(long, env = "VANISH_RATE_LIMIT_BURST", default_value_t = 20)]
    pub burst: u32,

    /// Stricter rate limit for the authenticated posting endpoint
    #[arg(long, env = "VANISH_POST_RATE_LIMIT_PER_SECOND", default_value_t = 2)]
    pub post_per_second: u32,

    /// Burst allowance for the posting endpoint
    #[arg(long, env = "VANISH_POST_RATE_LIMIT_BURST", default_value_t = 5)]
    pub post_burst: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "VANISH_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// OTLP endpoint for trace and metric export; disabled when unset
    #[arg(long, env = "VANISH_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Parses configuration from flags and environment.
    ///
    /// # Panics
    /// Panics if the length bounds are inverted; the process must not come up
    /// with a policy that rejects every message.
    pub fn load() -> Self {
        let config = Self::parse();
        assert!(
            config.messages.min_length <= config.messages.max_length,
            "--min-length must not exceed --max-length"
        );
        config
    }
}
