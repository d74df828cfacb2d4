use anyhow::Context;
use clap::{Parser, Subcommand};
use primer_kernel::Settings;

#[derive(Parser)]
#[command(name = "primer", version, about = "Run and inspect the primer example APIs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations, start every module, and serve HTTP (default)
    Serve,
    /// Print every module and the path it is mounted under
    Routes,
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load primer settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            primer_telemetry::init(&settings.telemetry)?;
            primer_app::run(settings).await
        }
        Command::Routes => {
            let registry = primer_app::build_registry(&settings)?;
            for module in registry.modules() {
                println!("{:<24} {}", module.name(), module.mount_path());
            }
            Ok(())
        }
        Command::Migrate => {
            primer_telemetry::init(&settings.telemetry)?;
            let applied = primer_app::migrate_only(&settings).await?;
            tracing::info!(applied, "migrations applied");
            println!("applied {} migration(s)", applied);
            Ok(())
        }
    }
}
