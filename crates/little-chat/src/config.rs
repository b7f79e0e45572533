use std::env;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use little_chat_core::DEFAULT_STREAM_IDLE_TIMEOUT;

const BASE_URL_VAR: &str = "LITTLE_CHAT_BASE_URL";
const STORAGE_VAR: &str = "LITTLE_CHAT_STORAGE";
const STREAM_TIMEOUT_VAR: &str = "LITTLE_CHAT_STREAM_TIMEOUT";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug)]
pub struct Error(String);

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Error {}

/// Settings of the terminal front-end, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub storage_path: PathBuf,
    pub stream_idle_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let base_url = env::var(BASE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let storage_path = match env::var_os(STORAGE_VAR) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_storage_path().ok_or_else(|| {
                Error(format!(
                    "no data directory found, set {STORAGE_VAR} instead"
                ))
            })?,
        };

        let stream_idle_timeout = match env::var(STREAM_TIMEOUT_VAR) {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => Some(DEFAULT_STREAM_IDLE_TIMEOUT),
        };

        Ok(Self {
            base_url,
            storage_path,
            stream_idle_timeout,
        })
    }
}

fn default_storage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("little-chat").join("storage.json"))
}

/// Parses a timeout in seconds, `0` disables it.
fn parse_timeout(value: &str) -> Result<Option<Duration>, Error> {
    let secs: u64 = value.trim().parse().map_err(|_| {
        Error(format!("{STREAM_TIMEOUT_VAR} must be a number of seconds"))
    })?;
    if secs == 0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs(secs)))
}
