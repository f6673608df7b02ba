//! `dbmigrate status` command - Show applied and pending migrations.

use dbmigrate_core::{MigrationConfig, Migrator};

use crate::cli::ConnectionArgs;
use crate::commands::{Settings, open_store};
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

/// Run the status command
pub async fn run(config: &Config, args: ConnectionArgs) -> CliResult<()> {
    let settings = Settings::resolve(config, &args)?;
    let store = open_store(&settings).await?;
    let migrator = Migrator::new(store, MigrationConfig::new().migrations_dir(&settings.dir));

    let status = migrator.status().await?;

    output::header("Migration Status");
    output::kv("Provider", &settings.provider.to_string());
    output::kv("Directory", &settings.dir.display().to_string());
    output::kv("Table", &settings.table);
    output::newline();

    for name in &status.applied {
        output::list_item(&format!("{} {name}", output::style_success("applied")));
    }
    for name in &status.pending {
        output::list_item(&format!("{} {name}", output::style_pending("pending")));
    }
    for name in &status.empty {
        output::list_item(&format!("empty   {name}"));
    }

    output::newline();
    if status.is_up_to_date() {
        output::success("Database is up to date");
    } else {
        output::warn(&format!("{} pending migration(s)", status.pending.len()));
    }

    Ok(())
}
