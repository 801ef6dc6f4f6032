//! Hub-provided environment (`JUPYTERHUB_*`), read once at startup.

use anyhow::Result;
use config::{Config, Environment, Map};
use serde::{Deserialize, Serialize};

/// Default idle cull timeout in seconds.
pub const DEFAULT_CULL_TIMEOUT: &str = "3600";
/// Default maximum server age in seconds.
pub const DEFAULT_CULL_MAX_AGE: &str = "28800";

const ENV_PREFIX: &str = "JUPYTERHUB";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub api_url: String,
    pub api_token: String,
    pub server_name: String,
    pub cull_timeout: String,
    pub cull_max_age: String,
    pub service_prefix: String,
}

impl HubConfig {
    pub fn from_env() -> Result<Self> {
        Self::build(Environment::with_prefix(ENV_PREFIX))
    }

    /// Same as [`HubConfig::from_env`] but reads `vars` instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::build(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    fn build(environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .set_default("api_url", "")?
            .set_default("api_token", "")?
            .set_default("server_name", "")?
            .set_default("cull_timeout", DEFAULT_CULL_TIMEOUT)?
            .set_default("cull_max_age", DEFAULT_CULL_MAX_AGE)?
            .set_default("service_prefix", "")?
            .add_source(environment)
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// An authority is configured when the API URL is non-empty.
    pub fn has_authority(&self) -> bool {
        !self.api_url.is_empty()
    }

    pub fn user_endpoint(&self) -> String {
        format!("{}/user", self.api_url)
    }
}
