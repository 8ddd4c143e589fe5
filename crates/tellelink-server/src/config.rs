use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use tellelink_api::shortener::{DEFAULT_ENDPOINT, ShortenerConfig};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub admin_usernames: Vec<String>,
    pub shortener: ShortenerConfig,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = var("TELLELINK_JWT_SECRET", "");
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("TELLELINK_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("TELLELINK_HOST", "0.0.0.0");
        let port: u16 = var("TELLELINK_PORT", "3000")
            .parse()
            .context("TELLELINK_PORT must be a port number")?;
        let ip: IpAddr = host
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .context("TELLELINK_HOST must be an IP address")?;
        let addr = SocketAddr::new(ip, port);

        let admin_usernames = var("TELLELINK_ADMIN_USERNAMES", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let shortener = ShortenerConfig {
            endpoint: var("TELLELINK_SHORTENER_URL", DEFAULT_ENDPOINT),
            api_key: get("TELLELINK_SHORTENER_API_KEY").filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(secs(&get, "TELLELINK_SHORTENER_TIMEOUT_SECS", 5)?),
        };

        // Shortening must finish before the request deadline, otherwise a post
        // can commit after the client has already been sent a timeout.
        let request_timeout = Duration::from_secs(secs(&get, "TELLELINK_REQUEST_TIMEOUT_SECS", 15)?);
        if shortener.timeout >= request_timeout {
            bail!(
                "TELLELINK_SHORTENER_TIMEOUT_SECS ({}s) must be below TELLELINK_REQUEST_TIMEOUT_SECS ({}s)",
                shortener.timeout.as_secs(),
                request_timeout.as_secs()
            );
        }

        Ok(Self {
            addr,
            db_path: var("TELLELINK_DB_PATH", "tellelink.db").into(),
            jwt_secret,
            admin_usernames,
            shortener,
            request_timeout,
        })
    }
}

fn secs(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match get(key) {
        Some(raw) => raw.parse().with_context(|| format!("{} must be a whole number of seconds", key)),
        None => Ok(default),
    }
}
