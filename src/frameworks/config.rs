use serde::Deserialize;
use std::{env, fmt, fs, str::FromStr, time::Duration};
use url::Url;

use crate::domain::Ballot;
use crate::use_cases::{DelayRange, RepeatPolicy};

// Runtime configuration. Precedence: env vars, then the optional TOML file
// named by `POLL_VOTER_CONFIG`, then the defaults below.

pub const CONFIG_PATH_VAR: &str = "POLL_VOTER_CONFIG";

const DEFAULT_HANDSHAKE_URL: &str = "https://www.riddle.com/embed/ws/handshake/access-token";
const DEFAULT_RIDDLE_ID: u64 = 514690;
const DEFAULT_ANSWER: &str = "1.66";
const DEFAULT_REFERER: &str = "https://www.riddle.com/";
const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3"
);
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_EXCHANGE_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MIN_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
// 0 means repeat until shutdown.
const DEFAULT_ATTEMPTS: u32 = 1;

/// Optional file layer. Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub handshake_url: Option<String>,
    pub riddle_id: Option<u64>,
    pub answer: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub http_timeout_ms: Option<u64>,
    pub exchange_timeout_ms: Option<u64>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub attempts: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Handshake URL with the riddle id already appended.
    pub handshake_url: Url,
    pub riddle_id: u64,
    pub answer: String,
    pub referer: String,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub exchange_timeout: Duration,
    pub delay: DelayRange,
    pub repeat: RepeatPolicy,
}

impl PollConfig {
    pub fn ballot(&self) -> Ballot {
        Ballot::answer(self.riddle_id, self.answer.clone())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, message: String },
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, message } => {
                write!(f, "failed to read config file {path}: {message}")
            }
            ConfigError::Parse(message) => write!(f, "invalid config file: {message}"),
            ConfigError::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads configuration from the process environment and the optional file.
pub fn load() -> Result<PollConfig, ConfigError> {
    let file = match env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                path: path.clone(),
                message: e.to_string(),
            })?;
            parse_file(&text)?
        }
        Err(_) => FileConfig::default(),
    };
    resolve(file, |key| env::var(key).ok())
}

pub fn parse_file(text: &str) -> Result<FileConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Merges the layers. Env values that fail to parse are ignored, as if unset.
pub fn resolve<E>(file: FileConfig, env: E) -> Result<PollConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let base_url = pick_string(
        &env,
        "POLL_HANDSHAKE_URL",
        file.handshake_url,
        DEFAULT_HANDSHAKE_URL,
    );
    let riddle_id = pick(&env, "POLL_RIDDLE_ID", file.riddle_id, DEFAULT_RIDDLE_ID);
    let answer = pick_string(&env, "POLL_ANSWER", file.answer, DEFAULT_ANSWER);
    let referer = pick_string(&env, "POLL_REFERER", file.referer, DEFAULT_REFERER);
    let user_agent = pick_string(
        &env,
        "POLL_USER_AGENT",
        file.user_agent,
        DEFAULT_USER_AGENT,
    );
    let http_timeout_ms = pick(
        &env,
        "POLL_HTTP_TIMEOUT_MS",
        file.http_timeout_ms,
        DEFAULT_HTTP_TIMEOUT_MS,
    );
    let exchange_timeout_ms = pick(
        &env,
        "POLL_EXCHANGE_TIMEOUT_MS",
        file.exchange_timeout_ms,
        DEFAULT_EXCHANGE_TIMEOUT_MS,
    );
    let min_delay_ms = pick(
        &env,
        "POLL_MIN_DELAY_MS",
        file.min_delay_ms,
        DEFAULT_MIN_DELAY_MS,
    );
    let max_delay_ms = pick(
        &env,
        "POLL_MAX_DELAY_MS",
        file.max_delay_ms,
        DEFAULT_MAX_DELAY_MS,
    );
    let attempts = pick(&env, "POLL_ATTEMPTS", file.attempts, DEFAULT_ATTEMPTS);

    if answer.trim().is_empty() {
        return Err(ConfigError::Invalid("answer must not be empty".to_string()));
    }
    if exchange_timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "exchange timeout must be greater than zero".to_string(),
        ));
    }
    if min_delay_ms > max_delay_ms {
        return Err(ConfigError::Invalid(format!(
            "min delay {min_delay_ms}ms exceeds max delay {max_delay_ms}ms"
        )));
    }

    Ok(PollConfig {
        handshake_url: handshake_url(&base_url, riddle_id)?,
        riddle_id,
        answer,
        referer,
        user_agent,
        http_timeout: Duration::from_millis(http_timeout_ms),
        exchange_timeout: Duration::from_millis(exchange_timeout_ms),
        delay: DelayRange::new(
            Duration::from_millis(min_delay_ms),
            Duration::from_millis(max_delay_ms),
        ),
        repeat: match attempts {
            0 => RepeatPolicy::unbounded(),
            n => RepeatPolicy { attempts: Some(n) },
        },
    })
}

fn handshake_url(base: &str, riddle_id: u64) -> Result<Url, ConfigError> {
    let mut url = Url::parse(base)
        .map_err(|e| ConfigError::Invalid(format!("handshake url {base:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ConfigError::Invalid(format!("handshake url {base:?} cannot take a path")))?
        .pop_if_empty()
        .push(&riddle_id.to_string());
    Ok(url)
}

fn pick<E, T>(env: &E, key: &str, file: Option<T>, default: T) -> T
where
    E: Fn(&str) -> Option<String>,
    T: FromStr,
{
    env(key)
        .and_then(|value| value.trim().parse().ok())
        .or(file)
        .unwrap_or(default)
}

fn pick_string<E>(env: &E, key: &str, file: Option<String>, default: &str) -> String
where
    E: Fn(&str) -> Option<String>,
{
    env(key)
        .filter(|value| !value.is_empty())
        .or(file)
        .unwrap_or_else(|| default.to_string())
}
