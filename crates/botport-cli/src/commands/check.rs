use botport_import::preflight::preflight;
use botport_import_types::ValidationLevel;
use clap::Args;
use colored::Colorize;

use super::batch::BatchArgs;

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub batch: BatchArgs,
}

impl CheckCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let batch = self.batch.load()?;
        let report = preflight(&batch);

        println!();
        println!(
            "{} {}",
            "Checked".bright_white().bold(),
            format!("{} files", batch.len()).bright_cyan()
        );

        let warnings = report.messages(ValidationLevel::Warning);
        let notes = report.messages(ValidationLevel::Info);
        if warnings.is_empty() && notes.is_empty() {
            println!("{}", "✅ Every file will be imported".bright_green());
        }
        for warning in warnings {
            println!("  {} {}", "⚠️ ".bright_yellow(), warning.bright_yellow());
        }
        for note in notes {
            println!("  {} {}", "ℹ️ ".bright_blue(), note);
        }
        println!();

        if !report.can_proceed() {
            anyhow::bail!("the batch cannot be imported as is");
        }
        Ok(())
    }
}
