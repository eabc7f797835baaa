use botport_import::ImportDispatcher;
use botport_import_types::ImportParams;
use botport_store::{establish_connection, sea_orm_ports, DatabaseConfig};
use clap::Args;
use colored::Colorize;
use tracing::{debug, info};

use super::batch::BatchArgs;

#[derive(Args)]
pub struct ImportCommand {
    /// Database connection URL
    #[arg(long, env = "BOTPORT_DATABASE_URL")]
    pub database_url: String,

    /// Project the batch is imported into
    #[arg(long, env = "BOTPORT_PROJECT_ID")]
    pub project_id: String,

    /// Delete the project's existing responses, conversations and
    /// activity before importing
    #[arg(long)]
    pub wipe: bool,

    #[command(flatten)]
    pub batch: BatchArgs,
}

impl ImportCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let batch = self.batch.load()?;
        let file_count = batch.len();
        info!(
            "Importing {} files into project {}",
            file_count, self.project_id
        );

        debug!("Initializing database connection...");
        let config = DatabaseConfig::from_env(self.database_url.as_str())?;
        let rt = tokio::runtime::Runtime::new()?;
        let db = rt.block_on(establish_connection(&config))?;

        let dispatcher = ImportDispatcher::new(&sea_orm_ports(db));
        let params = ImportParams::new(self.project_id.as_str()).wipe(self.wipe);
        let errors = rt.block_on(dispatcher.dispatch(batch, params));

        println!();
        if errors.is_empty() {
            println!(
                "{} {} {}",
                "✅ Imported".bright_green().bold(),
                file_count.to_string().bright_white().bold(),
                format!("files into project {}", self.project_id).bright_green()
            );
            println!();
            return Ok(());
        }

        println!(
            "{}",
            format!("❌ Import finished with {} errors:", errors.len())
                .bright_red()
                .bold()
        );
        for error in &errors {
            println!("  {} {}", "•".bright_red(), error);
        }
        println!();

        anyhow::bail!("{} of the batch could not be imported", errors.len())
    }
}
