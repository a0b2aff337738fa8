use std::env;
use std::net::SocketAddr;

use anyhow::Context;

use crate::ai::config::AiConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ai: Option<AiConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("APP_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {value}"))?,
            Err(_) => 8080,
        };
        let ai = AiConfig::from_env();
        Ok(Self { host, port, ai })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
