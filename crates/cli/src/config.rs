// SPDX-License-Identifier: MIT

//! Loads the recognized options of spec.md §6 from a TOML file, then
//! layers `CIRUN_*` environment overrides on top.

use cirun_engine::{Config, OidcConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("invalid {field} value {value:?}: {source}")]
    InvalidEnvOverride {
        field: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawOidcConfig {
    enabled: Option<bool>,
    issuer: Option<String>,
    audience: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    volumes: Option<Vec<String>>,
    total_memory_limit: Option<u64>,
    service_container_default_memory_limit: Option<u64>,
    build_container_minimum_memory: Option<u64>,
    cpu_limits: Option<bool>,
    default_image: Option<String>,
    default_services: Option<Vec<String>>,
    default_caches: Option<Vec<String>>,
    oidc: RawOidcConfig,
    color: Option<bool>,
}

/// Loads `path` if it exists (a missing file is not an error — every
/// field just falls back to `Config::default()`), then applies `CIRUN_*`
/// environment overrides on top.
pub fn load(path: &std::path::Path) -> Result<Config, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<RawConfig>(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let default = Config::default();
    let mut config = Config {
        volumes: raw.volumes.unwrap_or(default.volumes),
        total_memory_limit_mib: raw.total_memory_limit.unwrap_or(default.total_memory_limit_mib),
        service_container_default_memory_limit_mib: raw
            .service_container_default_memory_limit
            .unwrap_or(default.service_container_default_memory_limit_mib),
        build_container_minimum_memory_mib: raw
            .build_container_minimum_memory
            .unwrap_or(default.build_container_minimum_memory_mib),
        cpu_limits: raw.cpu_limits.unwrap_or(default.cpu_limits),
        default_image: raw.default_image.unwrap_or(default.default_image),
        default_services: raw.default_services.unwrap_or(default.default_services),
        default_caches: raw.default_caches.unwrap_or(default.default_caches),
        oidc: OidcConfig {
            enabled: raw.oidc.enabled.unwrap_or(default.oidc.enabled),
            issuer: raw.oidc.issuer.unwrap_or(default.oidc.issuer),
            audience: raw.oidc.audience.unwrap_or(default.oidc.audience),
        },
        color: raw.color.unwrap_or(default.color),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn env_u64(field: &'static str, key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|source| ConfigError::InvalidEnvOverride { field, value, source }),
        Err(_) => Ok(None),
    }
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
}

fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(v) = env_u64("total_memory_limit_mib", "CIRUN_TOTAL_MEMORY_LIMIT")? {
        config.total_memory_limit_mib = v;
    }
    if let Some(v) = env_u64(
        "service_container_default_memory_limit_mib",
        "CIRUN_SERVICE_MEMORY_LIMIT",
    )? {
        config.service_container_default_memory_limit_mib = v;
    }
    if let Some(v) = env_u64(
        "build_container_minimum_memory_mib",
        "CIRUN_BUILD_CONTAINER_MIN_MEMORY",
    )? {
        config.build_container_minimum_memory_mib = v;
    }
    if let Some(v) = env_bool("CIRUN_CPU_LIMITS") {
        config.cpu_limits = v;
    }
    if let Ok(v) = std::env::var("CIRUN_DEFAULT_IMAGE") {
        config.default_image = v;
    }
    if let Some(v) = env_bool("CIRUN_OIDC_ENABLED") {
        config.oidc.enabled = v;
    }
    if let Ok(v) = std::env::var("CIRUN_OIDC_ISSUER") {
        config.oidc.issuer = v;
    }
    if let Ok(v) = std::env::var("CIRUN_OIDC_AUDIENCE") {
        config.oidc.audience = v;
    }
    if let Some(v) = env_bool("CIRUN_COLOR") {
        config.color = v;
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
