//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: GateConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_port_override(&mut config, std::env::var("PORT").ok().as_deref());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the configuration for the server binary.
///
/// Uses `path` when given, then `GATE_CONFIG`, then built-in defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }
    if let Ok(env_path) = std::env::var("GATE_CONFIG") {
        return load_config(Path::new(&env_path));
    }

    let mut config = GateConfig::default();
    apply_port_override(&mut config, std::env::var("PORT").ok().as_deref());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Replace the listener port with `port`, keeping the host part.
fn apply_port_override(config: &mut GateConfig, port: Option<&str>) {
    let Some(port) = port.and_then(|p| p.trim().parse::<u16>().ok()) else {
        return;
    };
    let host = config
        .listener
        .bind_address
        .rsplit_once(':')
        .map(|(host, _)| host.to_string())
        .unwrap_or_else(|| "0.0.0.0".to_string());
    config.listener.bind_address = format!("{}:{}", host, port);
}
