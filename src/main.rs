use anyhow::{Context, Result};
use lambda_dynamic_trigger::app::{self, App};
use lambda_dynamic_trigger::client;
use lambda_dynamic_trigger::conf::Settings;
use std::path::Path;

/// Read the service document, bind the triggers stored in the
/// parameter store to its functions, and write the result.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
    let settings: Settings = envy::from_env()?;
    let mut service = app::load_service(Path::new(&settings.service_definition)).await?;
    let app = App::new(settings, &service)?;
    client::init(&app.settings, &app.config.region).await?;

    let bindings = app
        .before_compile_events(client::current(), &service)
        .await
        .context("Failed to register dynamic triggers")?;
    app.config.write_back(&mut service);
    app::apply(&mut service, &bindings)?;

    app::write_service(&service, app.settings.output.as_deref().map(Path::new)).await
}
