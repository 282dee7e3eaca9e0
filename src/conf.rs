//! Defines configuration as read from the environment, and the
//! dynamic trigger configuration as found in the service document.

use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;

/// Default `service_definition` value.
fn default_service_definition() -> String {
    String::from("serverless.json")
}

/// The process settings, given as environment variables.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// The region used when the dynamic trigger configuration
    /// doesn't specify one.
    #[serde(default)]
    pub aws_default_region: Option<String>,

    /// Overrides the endpoint of the parameter store. A missing
    /// scheme is completed with `https://`.
    #[serde(default)]
    pub aws_endpoint_url: Option<String>,

    /// Path to the service document, in JSON, holding both the
    /// `custom.dynamicTrigger` block and the `functions` map.
    #[serde(default = "default_service_definition")]
    pub service_definition: String,

    /// Path where the mutated service document is written. If
    /// omitted, the document is written to standard output.
    #[serde(default)]
    pub output: Option<String>,
}

/// One function that gets its triggers from the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfigEntry {
    /// The name of the function, as a key of the service's
    /// `functions` map.
    pub name: String,

    /// The parameter holding a comma-separated list of ARNs.
    pub ssm_path: String,
}

/// The validated `custom.dynamicTrigger` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// The region of the parameter store.
    pub region: String,

    /// The configured functions, in configuration order.
    pub functions: Vec<TriggerConfigEntry>,
}

/// JavaScript-flavoured truthiness, since the service document is
/// written for a host with those semantics.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Extract a string field from a function entry.
fn string_field(
    entry: &serde_json::Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<String, Error> {
    match entry.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(Error::ConfigInvalid(format!(
            "functions[{}].{} must be a string",
            index, field
        ))),
        None => Err(Error::ConfigInvalid(format!(
            "functions[{}].{} is missing",
            index, field
        ))),
    }
}

impl PluginConfig {
    /// Validate the `custom.dynamicTrigger` block of a service
    /// document, filling the region with `default_region` when it's
    /// unset. Unrelated fields are ignored.
    pub fn from_service(service: &Value, default_region: Option<&str>) -> Result<Self, Error> {
        let block = service
            .pointer("/custom/dynamicTrigger")
            .filter(|block| truthy(block))
            .ok_or(Error::ConfigMissing)?;

        let region = match block.get("region") {
            Some(region) if truthy(region) => region.clone(),
            _ => default_region.map(Value::from).unwrap_or(Value::Null),
        };
        let region = match region {
            Value::String(region) => region,
            Value::Null => {
                return Err(Error::ConfigInvalid(String::from(
                    "region is not set and AWS_DEFAULT_REGION is not available",
                )))
            }
            _ => return Err(Error::ConfigInvalid(String::from("region must be a string"))),
        };

        let entries = match block.get("functions") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(Error::ConfigInvalid(String::from("functions must be a list"))),
            None => return Err(Error::ConfigInvalid(String::from("functions is missing"))),
        };
        let functions = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| -> Result<TriggerConfigEntry, Error> {
                let entry = entry.as_object().ok_or_else(|| {
                    Error::ConfigInvalid(format!("functions[{}] must be a mapping", index))
                })?;
                Ok(TriggerConfigEntry {
                    name: string_field(entry, "name", index)?,
                    ssm_path: string_field(entry, "ssmPath", index)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(PluginConfig { region, functions })
    }

    /// Write the resolved region back into the service document, so
    /// that later readers of the `custom.dynamicTrigger` block see
    /// it.
    pub fn write_back(&self, service: &mut Value) {
        if let Some(block) = service
            .pointer_mut("/custom/dynamicTrigger")
            .and_then(Value::as_object_mut)
        {
            block.insert(String::from("region"), Value::from(self.region.as_str()));
        }
    }

    /// The parameter paths of every configured function, in
    /// configuration order. Duplicates are kept.
    pub fn ssm_paths(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.ssm_path.clone()).collect()
    }
}
