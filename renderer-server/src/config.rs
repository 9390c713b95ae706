use renderer_core::DEFAULT_CANVAS_WIDTH;

use std::env;

use anyhow::Context;

const SERVER_PORT_KEY: &str = "SERVER_PORT";
const DEFAULT_WIDTH_KEY: &str = "DEFAULT_WIDTH";
const MAX_WIDTH_KEY: &str = "MAX_WIDTH";
const MAX_BODY_BYTES_KEY: &str = "MAX_BODY_BYTES";

const DEFAULT_SERVER_PORT: &str = "3000";
const DEFAULT_MAX_WIDTH: u32 = 8000;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: String,
    // Width used when a request does not ask for one.
    pub default_width: u32,
    pub max_width: u32,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let server_port = lookup(SERVER_PORT_KEY).unwrap_or_else(|| DEFAULT_SERVER_PORT.into());

        let default_width = parse_or(&lookup, DEFAULT_WIDTH_KEY, DEFAULT_CANVAS_WIDTH)?;
        let max_width = parse_or(&lookup, MAX_WIDTH_KEY, DEFAULT_MAX_WIDTH)?;
        let max_body_bytes = parse_or(&lookup, MAX_BODY_BYTES_KEY, DEFAULT_MAX_BODY_BYTES)?;

        if default_width == 0 || default_width > max_width {
            anyhow::bail!(
                "{} must be between 1 and {} ({}), got {}",
                DEFAULT_WIDTH_KEY,
                MAX_WIDTH_KEY,
                max_width,
                default_width
            );
        }

        Ok(Config {
            server_port,
            default_width,
            max_width,
            max_body_bytes,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("failed to parse {} from {:?}", key, raw)),
        None => Ok(default),
    }
}
