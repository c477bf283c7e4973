use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{collections::HashMap, env, fs};
use tracing::{info, warn};

pub static CONFIG: OnceCell<ApiConfig> = OnceCell::new();

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub subsquid: SubsquidConfig,
    pub summary: SummaryConfig,
    pub delegates: DelegatesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Per-network indexer endpoints. The key set doubles as the set of
/// supported networks for request validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubsquidConfig {
    pub endpoints: HashMap<String, String>,
}

impl Default for SubsquidConfig {
    fn default() -> Self {
        let mut endpoints = HashMap::new();
        endpoints.insert(
            "polkadot".to_string(),
            "https://squid.subsquid.io/gov-polkadot/graphql".to_string(),
        );
        endpoints.insert(
            "kusama".to_string(),
            "https://squid.subsquid.io/gov-kusama/graphql".to_string(),
        );
        Self { endpoints }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SummaryConfig {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DelegatesConfig {
    pub curated: Vec<CuratedDelegate>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CuratedDelegate {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

pub fn load() -> Result<()> {
    let config = load_config();
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("API config already initialized"))?;
    Ok(())
}

pub fn get_config() -> &'static ApiConfig {
    CONFIG.get().expect("API config not initialized")
}

fn load_config() -> ApiConfig {
    let path = env::var("GOVHUB_CONFIG_PATH").unwrap_or_else(|_| "govhub.yaml".to_string());
    let mut config = match fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml::from_str::<ApiConfig>(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, path = %path, "Failed to parse API config, using defaults");
                ApiConfig::default()
            }
        },
        Err(err) => {
            warn!(error = %err, path = %path, "API config not found, using defaults");
            ApiConfig::default()
        }
    };

    apply_env_overrides(&mut config);

    info!(
        networks = config.subsquid.endpoints.len(),
        curated_delegates = config.delegates.curated.len(),
        summary_endpoint = config.summary.endpoint.is_some(),
        listen_addr = %config.server.listen_addr,
        "API config loaded"
    );

    config
}

fn apply_env_overrides(config: &mut ApiConfig) {
    if let Ok(value) = env::var("GOVHUB_SUBSQUID_ENDPOINTS") {
        match serde_json::from_str::<HashMap<String, String>>(&value) {
            Ok(map) => {
                config.subsquid.endpoints = map;
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "Failed to parse GOVHUB_SUBSQUID_ENDPOINTS override"
                );
            }
        }
    }

    if let Ok(value) = env::var("GOVHUB_SUMMARY_ENDPOINT") {
        config.summary.endpoint = Some(value);
    }

    if let Ok(value) = env::var("GOVHUB_LISTEN_ADDR") {
        config.server.listen_addr = value;
    }
}
