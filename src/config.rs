//! Runtime configuration from environment variables and flags.

use tracing::warn;

/// Topic carrying the generated particle batches.
pub const PARTICLE_TOPIC: &str = "/topic/bowerick.message.generator";

/// Subscription id used for SUBSCRIBE and the matching UNSUBSCRIBE.
pub const SUBSCRIPTION_ID: &str = "particles";

/// Broker address used when neither env nor flags override it.
pub const DEFAULT_BROKER_ADDR: &str = "127.0.0.1:2000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub broker_addr: String,
    pub headless: bool,
}

impl Config {
    /// Read configuration from `BOWERICK_ADDR` and the command line.
    /// `--addr=HOST:PORT` wins over the environment.
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1), std::env::var("BOWERICK_ADDR").ok())
    }

    fn parse(args: impl Iterator<Item = String>, env_addr: Option<String>) -> Self {
        let mut config = Config {
            broker_addr: env_addr.unwrap_or_else(|| DEFAULT_BROKER_ADDR.to_string()),
            headless: false,
        };
        for arg in args {
            if arg == "--headless" {
                config.headless = true;
            } else if let Some(addr) = arg.strip_prefix("--addr=") {
                config.broker_addr = addr.to_string();
            } else {
                warn!(arg = %arg, "Ignoring unknown argument");
            }
        }
        config
    }
}
