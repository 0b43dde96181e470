use galley_core::exploration::DEFAULT_BASE_EPSILON;
use galley_core::rules::DEFAULT_MIN_RATING_COUNT;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Portions written on every materialized menu plan (default: `0`).
    pub default_portions: i32,
    /// Floor the adaptive exploration rate decays toward (default: `0.1`).
    pub base_epsilon: f64,
    /// Minimum ratings before a pairing takes part in rule analysis.
    pub rule_min_rating_count: i64,
    /// External rule validator. `None` disables AI validation.
    pub rule_validator: Option<RuleValidatorConfig>,
    /// Log line format (default: text).
    pub log_format: LogFormat,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON output; anything else is text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Endpoint of the external rule validation service.
#[derive(Debug, Clone)]
pub struct RuleValidatorConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `ROTATION_DEFAULT_PORTIONS` | `0`                     |
    /// | `EXPLORATION_BASE_EPSILON`  | `0.1`                   |
    /// | `RULE_MIN_RATING_COUNT`     | `3`                     |
    /// | `RULE_VALIDATOR_URL`        | unset                   |
    /// | `RULE_VALIDATOR_API_KEY`    | unset                   |
    /// | `LOG_FORMAT`                | `text` (or `json`)      |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let default_portions: i32 = std::env::var("ROTATION_DEFAULT_PORTIONS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("ROTATION_DEFAULT_PORTIONS must be a valid i32");
        assert!(
            default_portions >= 0,
            "ROTATION_DEFAULT_PORTIONS must not be negative"
        );

        let base_epsilon: f64 = std::env::var("EXPLORATION_BASE_EPSILON")
            .ok()
            .map(|v| {
                v.parse()
                    .expect("EXPLORATION_BASE_EPSILON must be a valid f64")
            })
            .unwrap_or(DEFAULT_BASE_EPSILON);
        assert!(
            (0.0..=0.5).contains(&base_epsilon),
            "EXPLORATION_BASE_EPSILON must be between 0.0 and 0.5"
        );

        let rule_min_rating_count: i64 = std::env::var("RULE_MIN_RATING_COUNT")
            .ok()
            .map(|v| v.parse().expect("RULE_MIN_RATING_COUNT must be a valid i64"))
            .unwrap_or(DEFAULT_MIN_RATING_COUNT);

        let rule_validator = std::env::var("RULE_VALIDATOR_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| RuleValidatorConfig {
                url,
                api_key: std::env::var("RULE_VALIDATOR_API_KEY").ok(),
            });

        let log_format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            default_portions,
            base_epsilon,
            rule_min_rating_count,
            rule_validator,
            log_format,
        }
    }
}
