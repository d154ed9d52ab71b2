use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Service configuration, loaded from the environment (a `.env` file is
/// honored via dotenvy before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ws_port: u16,
    pub app_env: String,

    /// How many operations the autonomous driver keeps active; 0 disables it.
    pub autonomous_miners: usize,

    pub mining_tick_ms: u64,
    pub aggregation_tick_ms: u64,
    pub metrics_tick_ms: u64,
    pub security_tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ws_port: 8081,
            app_env: "development".to_string(),
            autonomous_miners: 3,
            mining_tick_ms: 1000,
            aggregation_tick_ms: 5000,
            metrics_tick_ms: 10_000,
            security_tick_ms: 45_000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Ok(val) = env::var(name) {
        *target = val
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name, val))?;
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(val) = env::var("HOST") {
            config.host = val;
        }
        if let Ok(val) = env::var("APP_ENV") {
            config.app_env = val;
        }
        parse_var("PORT", &mut config.port)?;
        parse_var("WS_PORT", &mut config.ws_port)?;
        parse_var("AUTONOMOUS_MINERS", &mut config.autonomous_miners)?;
        parse_var("MINING_TICK_MS", &mut config.mining_tick_ms)?;
        parse_var("AGGREGATION_TICK_MS", &mut config.aggregation_tick_ms)?;
        parse_var("METRICS_TICK_MS", &mut config.metrics_tick_ms)?;
        parse_var("SECURITY_TICK_MS", &mut config.security_tick_ms)?;

        Ok(config)
    }

    /// Anything that is not explicitly production counts as development.
    pub fn is_dev(&self) -> bool {
        self.app_env != "production"
    }
}
