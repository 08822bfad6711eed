use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

const DATA_DIR: &str = "QUIETROOMS_DATA_DIR";
const BIND: &str = "QUIETROOMS_BIND";
const SESSION_MINUTES: &str = "QUIETROOMS_SESSION_MINUTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    pub session_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_minutes: 60,
        }
    }
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Config> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let mut config = Config::default();

        if let Some(dir) = lookup(DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup(BIND) {
            config.bind = bind
                .parse()
                .with_context(|| format!("{BIND}={bind:?} is not a socket address"))?;
        }
        if let Some(minutes) = lookup(SESSION_MINUTES) {
            config.session_minutes = minutes
                .parse()
                .ok()
                .filter(|m: &i64| *m > 0)
                .with_context(|| format!("{SESSION_MINUTES}={minutes:?} is not a positive number"))?;
        }

        Ok(config)
    }
}
