use serde::{Deserialize, Serialize};

/// Core configuration.
///
/// The only externally tunable knobs are the overall lookup deadline and
/// the response/buffer sizing; everything else in the core is static.
#[derive(Debug, Clone)]
pub struct Config {
    /// Single deadline covering connect, send and receive, in seconds.
    pub timeout_seconds: u64,
    /// Hard cap on the accumulated response, in bytes.
    pub max_response_size: usize,
    /// Size of the read buffer used by the transport.
    pub buffer_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    pub timeout_seconds: u64,
    pub max_response_size: usize,
    pub buffer_size: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut settings = config::Config::builder()
            .set_default("timeout_seconds", 15_i64)?
            .set_default("max_response_size", (1024 * 1024) as i64)?
            .set_default("buffer_size", 8192_i64)?;

        settings = Self::apply_env_overrides(settings)?;

        let config_data: ConfigData = settings.build()?.try_deserialize()?;

        Ok(Config {
            timeout_seconds: config_data.timeout_seconds,
            max_response_size: config_data.max_response_size,
            buffer_size: config_data.buffer_size,
        })
    }

    fn apply_env_overrides(
        mut settings: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let env_mappings = [
            ("WHOIS_TIMEOUT_SECONDS", "timeout_seconds"),
            ("WHOIS_TIMEOUT", "timeout_seconds"),
            ("WHOIS_MAX_RESPONSE_SIZE", "max_response_size"),
            ("WHOIS_BUFFER_SIZE", "buffer_size"),
        ];

        for (env_var, config_key) in env_mappings {
            if let Ok(value) = std::env::var(env_var) {
                settings = settings.set_override(config_key, value)?;
            }
        }

        Ok(settings)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            max_response_size: 1024 * 1024,
            buffer_size: 8192,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.timeout_seconds >= 10 && config.timeout_seconds <= 20);
        assert!(config.max_response_size >= 64 * 1024);
        assert!(config.buffer_size >= 1024);
    }
}
