//! Botport CLI
//!
//! Imports exported project files into a project's database.

mod commands;

use clap::{Parser, Subcommand};
use commands::{CheckCommand, ImportCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "BOTPORT_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "BOTPORT_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a batch of project files
    Import(ImportCommand),
    /// Report what an import of the batch would skip, without importing
    Check(CheckCommand),
}

/// All botport crates at `level`, noisy dependencies at warn.
/// The binary itself logs under the `botport` target.
fn default_filter(level: &str) -> String {
    format!(
        "botport={level},\
         botport_import={level},\
         botport_store={level},\
         botport_entities={level},\
         botport_migrations={level},\
         sqlx=warn,\
         sea_orm=warn,\
         sea_orm_migration=warn"
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e))?
    } else {
        tracing_subscriber::EnvFilter::try_new(default_filter(&cli.log_level))
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", cli.log_level, e))?
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global default subscriber: {}", e))?;

    match cli.command {
        Commands::Import(import_cmd) => import_cmd.execute(),
        Commands::Check(check_cmd) => check_cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_names_each_crate_target() {
        let filter = default_filter("debug");

        let targets: Vec<&str> = filter
            .split(',')
            .filter_map(|directive| directive.split('=').next())
            .collect();
        assert_eq!(
            targets,
            vec![
                "botport",
                "botport_import",
                "botport_store",
                "botport_entities",
                "botport_migrations",
                "sqlx",
                "sea_orm",
                "sea_orm_migration"
            ]
        );
        assert!(tracing_subscriber::EnvFilter::try_new(&filter).is_ok());
    }
}
