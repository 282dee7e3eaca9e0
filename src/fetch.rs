//! Fetches the trigger lists of every configured function from the
//! parameter store.

use crate::client::ParameterStore;
use crate::conf::PluginConfig;
use crate::error::Error;
use anyhow::{Context, Result};
use tracing::{debug, instrument};

/// A configured function together with the raw value of its
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFunctionConfig {
    pub name: String,
    pub ssm_path: String,

    /// The comma-separated list of ARNs.
    pub value: String,
}

/// Reads the parameters of every configured function in a single
/// request, and joins them back to the configuration by path. The
/// result follows configuration order. A path absent from the
/// response fails the whole fetch. Nothing is requested when no
/// function is configured.
#[instrument(skip_all, fields(region = %config.region))]
pub async fn fetch_function_configs<S: ParameterStore>(
    store: &S,
    config: &PluginConfig,
) -> Result<Vec<FetchedFunctionConfig>> {
    if config.functions.is_empty() {
        return Ok(Vec::new());
    }
    let ssm_paths = config.ssm_paths();
    let parameters = store
        .lookup(&ssm_paths)
        .await
        .context("Failed to fetch dynamic triggers from the parameter store")?;
    debug!("Received {} parameters", parameters.len());

    config
        .functions
        .iter()
        .map(|entry| -> Result<FetchedFunctionConfig> {
            let parameter = parameters
                .iter()
                .find(|p| p.name == entry.ssm_path)
                .ok_or_else(|| Error::MissingParameter(entry.ssm_path.clone()))?;
            Ok(FetchedFunctionConfig {
                name: entry.name.clone(),
                ssm_path: entry.ssm_path.clone(),
                value: parameter.value.clone(),
            })
        })
        .collect()
}
