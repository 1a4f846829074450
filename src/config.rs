use std::env;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_public_key: String,
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_public_key = env::var("DISCORD_PUBLIC_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("DISCORD_PUBLIC_KEY required".into()))?;

        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a valid u16, got {port:?}")))?,
            Err(_) => 3000,
        };

        let max_body_bytes = match env::var("MAX_BODY_BYTES") {
            Ok(limit) => limit.parse().map_err(|_| {
                Error::Config(format!("MAX_BODY_BYTES must be a byte count, got {limit:?}"))
            })?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            discord_public_key: discord_public_key.trim().to_string(),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            max_body_bytes,
        })
    }
}
