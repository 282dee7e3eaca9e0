//! Defines the read-only application state and the hook that binds
//! dynamic triggers to the service's functions.

use crate::client::ParameterStore;
use crate::conf::{PluginConfig, Settings};
use crate::fetch::fetch_function_configs;
use crate::trigger::{parse_triggers, TriggerEvent};
use anyhow::{Context, Result};
use itertools::Itertools;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs::{read_to_string, write};
use tokio::io::{stdout, AsyncWriteExt};
use tracing::{info, instrument, warn};

/// The new event list of every bound function, keyed by function
/// name.
pub type Bindings = BTreeMap<String, Vec<TriggerEvent>>;

/// An App is an initialized application state, derived from settings
/// and the validated dynamic trigger configuration.
#[derive(Debug)]
pub struct App {
    /// The original settings.
    pub settings: Settings,

    /// The validated configuration, with its region resolved.
    pub config: PluginConfig,
}

impl App {
    /// Initialize an App instance given a settings struct and the
    /// service document. Consumes the settings struct.
    pub fn new(settings: Settings, service: &Value) -> Result<Self> {
        let config = PluginConfig::from_service(service, settings.aws_default_region.as_deref())?;
        Ok(App { settings, config })
    }

    /// Runs before the host compiles function events: fetches the
    /// configured trigger lists and builds the events of every
    /// configured function found in the service, in the service's
    /// order. Nothing is returned unless every function is bound.
    #[instrument(skip_all)]
    pub async fn before_compile_events<S: ParameterStore>(
        &self,
        store: &S,
        service: &Value,
    ) -> Result<Bindings> {
        info!(
            "The functions the triggers will be registered for: {}",
            self.config.functions.iter().map(|f| &f.name).join(",")
        );
        let fetched = fetch_function_configs(store, &self.config).await?;

        let mut bindings = Bindings::new();
        let functions = service.get("functions").and_then(Value::as_object);
        for (name, function) in functions.into_iter().flatten() {
            let Some(found) = fetched.iter().find(|f| &f.name == name) else {
                continue;
            };
            if !function.is_object() {
                warn!("Function {:?} is not a mapping; its events are left untouched", name);
                continue;
            }
            let events = parse_triggers(&found.value)
                .with_context(|| format!("Failed to register triggers for function {:?}", name))?;
            info!(
                "Triggers will be registered for function {}: {}",
                name,
                events.iter().map(TriggerEvent::arn).join(",")
            );
            bindings.insert(name.clone(), events);
        }
        Ok(bindings)
    }
}

/// Replace the `events` of every bound function in the service
/// document. Previous events are discarded.
pub fn apply(service: &mut Value, bindings: &Bindings) -> Result<()> {
    let Some(functions) = service.get_mut("functions").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    for (name, events) in bindings {
        if let Some(function) = functions.get_mut(name).and_then(Value::as_object_mut) {
            function.insert(String::from("events"), serde_json::to_value(events)?);
        }
    }
    Ok(())
}

/// Read a JSON service document.
pub async fn load_service(path: &Path) -> Result<Value> {
    let contents = read_to_string(path)
        .await
        .with_context(|| format!("Failed to read service document {:?}", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse service document {:?}", path))
}

/// Write a JSON service document to the given path, or to standard
/// output if no path is given.
pub async fn write_service(service: &Value, path: Option<&Path>) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(service)?;
    contents.push('\n');
    if let Some(path) = path {
        write(path, contents)
            .await
            .with_context(|| format!("Failed to write service document {:?}", path))
    } else {
        let mut out = stdout();
        out.write_all(contents.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MemoryStore;
    use crate::error::Error;
    use serde_json::json;

    fn settings() -> Settings {
        Settings {
            aws_default_region: Some(String::from("eu-west-2")),
            aws_endpoint_url: None,
            service_definition: String::from("serverless.json"),
            output: None,
        }
    }

    fn service(functions: Value) -> Value {
        json!({
            "service": "foo",
            "custom": {
                "dynamicTrigger": {
                    "region": "foo-bar-10",
                    "functions": [{ "name": "handler", "ssmPath": "/stage/dynamic-trigger" }]
                }
            },
            "functions": functions
        })
    }

    async fn run(service: &mut Value, store: &MemoryStore) -> Result<Bindings> {
        let app = App::new(settings(), service)?;
        let bindings = app.before_compile_events(store, service).await?;
        apply(service, &bindings)?;
        Ok(bindings)
    }

    #[test]
    fn new_rejects_missing_configuration() {
        let err = App::new(settings(), &json!({ "functions": {} })).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::ConfigMissing));
    }

    #[tokio::test]
    async fn binds_configured_functions() {
        let store = MemoryStore::with(&[(
            "/stage/dynamic-trigger",
            "arn:aws:sns:foo-bar-10:1:a,arn:aws:sqs:foo-bar-10:1:b",
        )]);
        let mut service = service(json!({ "handler": { "handler": "index.handler", "events": [] } }));

        run(&mut service, &store).await.unwrap();

        assert_eq!(store.requests().len(), 1);
        assert_eq!(
            service.pointer("/functions/handler/events"),
            Some(&json!([
                { "sns": "arn:aws:sns:foo-bar-10:1:a" },
                { "sqs": "arn:aws:sqs:foo-bar-10:1:b" }
            ]))
        );
        assert_eq!(
            service.pointer("/functions/handler/handler"),
            Some(&json!("index.handler"))
        );
    }

    #[tokio::test]
    async fn leaves_unconfigured_functions_untouched() {
        let store = MemoryStore::with(&[(
            "/stage/dynamic-trigger",
            "arn:aws:sns:foo-bar-10:123456654321:id1",
        )]);
        let mut service = service(json!({
            "handler": { "events": [] },
            "notConfiguredFunction": { "events": [] }
        }));

        let bindings = run(&mut service, &store).await.unwrap();

        assert_eq!(bindings.keys().collect::<Vec<_>>(), vec!["handler"]);
        assert_eq!(
            service.pointer("/functions/notConfiguredFunction/events"),
            Some(&json!([]))
        );
    }

    #[tokio::test]
    async fn replaces_static_events() {
        let store = MemoryStore::with(&[("/stage/dynamic-trigger", "arn:aws:kinesis:r:a:s")]);
        let mut service = service(json!({
            "handler": { "events": [{ "http": "GET /" }, { "schedule": "rate(1 hour)" }] }
        }));

        run(&mut service, &store).await.unwrap();

        assert_eq!(
            service.pointer("/functions/handler/events"),
            Some(&json!([{ "stream": "arn:aws:kinesis:r:a:s" }]))
        );
    }

    #[tokio::test]
    async fn unknown_service_mutates_nothing() {
        let store = MemoryStore::with(&[(
            "/stage/dynamic-trigger",
            "arn:aws:unknown:foo-bar-10:123456654321:id1",
        )]);
        let mut service = service(json!({ "handler": { "events": [] } }));
        let before = service.clone();

        let err = run(&mut service, &store).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedService { .. })
        ));
        assert_eq!(service, before);
    }

    #[tokio::test]
    async fn duplicate_names_bind_the_first_entry() {
        let store = MemoryStore::with(&[
            ("/stage/first", "arn:aws:sns:r:a:first"),
            ("/stage/second", "arn:aws:sqs:r:a:second"),
        ]);
        let mut service = json!({
            "custom": {
                "dynamicTrigger": {
                    "functions": [
                        { "name": "handler", "ssmPath": "/stage/first" },
                        { "name": "handler", "ssmPath": "/stage/second" }
                    ]
                }
            },
            "functions": { "handler": {} }
        });

        run(&mut service, &store).await.unwrap();

        assert_eq!(
            service.pointer("/functions/handler/events"),
            Some(&json!([{ "sns": "arn:aws:sns:r:a:first" }]))
        );
    }

    #[tokio::test]
    async fn non_mapping_functions_are_skipped() {
        let store = MemoryStore::with(&[("/stage/dynamic-trigger", "arn:aws:sns:r:a:id")]);
        let mut service = service(json!({ "handler": "oops" }));
        let before = service.clone();

        let bindings = run(&mut service, &store).await.unwrap();

        assert!(bindings.is_empty());
        assert_eq!(service, before);
    }

    #[tokio::test]
    async fn writes_to_stdout_without_a_path() {
        write_service(&json!({ "service": "foo" }), None).await.unwrap();
    }

    #[tokio::test]
    async fn service_without_functions_is_a_no_op() {
        let store = MemoryStore::with(&[("/stage/dynamic-trigger", "arn:aws:sns:r:a:id")]);
        let mut service = json!({
            "custom": {
                "dynamicTrigger": {
                    "functions": [{ "name": "handler", "ssmPath": "/stage/dynamic-trigger" }]
                }
            }
        });

        let bindings = run(&mut service, &store).await.unwrap();

        assert!(bindings.is_empty());
        assert!(service.get("functions").is_none());
    }
}
