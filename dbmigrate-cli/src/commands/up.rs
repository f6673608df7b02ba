//! `dbmigrate up` command - Apply pending migrations.

use dbmigrate_core::{MigrationConfig, Migrator};

use crate::cli::UpArgs;
use crate::commands::{Settings, open_store};
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

/// Run the up command
pub async fn run(config: &Config, args: UpArgs) -> CliResult<()> {
    let mut settings = Settings::resolve(config, &args.connection)?;
    if args.no_transaction {
        settings.transactional = false;
    }

    let store = open_store(&settings).await?;
    let migrator = Migrator::new(
        store,
        MigrationConfig::new()
            .migrations_dir(&settings.dir)
            .dry_run(args.dry_run),
    );

    let report = migrator.run().await?;

    if report.dry_run {
        for name in &report.applied {
            output::info(&format!("Would apply {name}"));
        }
    }

    if report.has_changes() {
        output::success(&report.summary());
    } else {
        output::info(&report.summary());
    }

    Ok(())
}
