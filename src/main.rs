use anyhow::Context;
use primer_kernel::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load primer settings")?;
    primer_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "primer bootstrap starting"
    );

    primer_app::run(settings).await
}
