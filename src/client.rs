//! Defines the parameter store seam and the global SSM client.

use crate::conf::Settings;
use anyhow::{anyhow, Context, Result};
use aws_config::from_env;
use aws_sdk_ssm::config::Region;
use aws_sdk_ssm::Client;
use once_cell::sync::OnceCell;
use std::future::Future;

/// A single `{name, value}` pair as returned by the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub name: String,
    pub value: String,
}

/// A key/value lookup service able to read many keys in a single
/// round trip. Keys that don't exist are absent from the response,
/// and the response order is unspecified.
pub trait ParameterStore {
    fn lookup(
        &self,
        names: &[String],
    ) -> impl Future<Output = Result<Vec<StoredParameter>>> + Send;
}

impl ParameterStore for Client {
    async fn lookup(&self, names: &[String]) -> Result<Vec<StoredParameter>> {
        let response = self
            .get_parameters()
            .set_names(Some(names.to_vec()))
            .send()
            .await
            .with_context(|| format!("Failed to get parameters {:?}", names))?;
        Ok(response
            .parameters()
            .unwrap_or_default()
            .iter()
            .filter_map(|p| {
                Some(StoredParameter {
                    name: p.name()?.to_string(),
                    value: p.value()?.to_string(),
                })
            })
            .collect())
    }
}

/// Complete an endpoint override with a scheme, if it lacks one.
fn with_scheme(endpoint_url: &str) -> String {
    if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
        endpoint_url.to_string()
    } else {
        format!("https://{}", endpoint_url)
    }
}

/// Global SSM client instance.
static CURRENT: OnceCell<Client> = OnceCell::new();

/// Initialize the global SSM client for the given region.
pub async fn init(settings: &Settings, region: &str) -> Result<()> {
    let loader = from_env().region(Region::new(region.to_string()));
    let ssm_config = if let Some(endpoint_url) = &settings.aws_endpoint_url {
        loader.endpoint_url(with_scheme(endpoint_url))
    } else {
        loader
    }
    .load()
    .await;
    let client = Client::new(&ssm_config);
    CURRENT
        .set(client)
        .map_err(|_| anyhow!("client::CURRENT was already initialized"))
}

/// Get the current SSM client instance, or panic if it hasn't been
/// initialized.
pub fn current() -> &'static Client {
    CURRENT.get().expect("client is not initialized")
}
