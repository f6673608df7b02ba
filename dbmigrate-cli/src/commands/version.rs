//! `dbmigrate version` command - Display version information.

use crate::error::CliResult;
use crate::output::{self, kv};

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
const NAME: &str = env!("CARGO_PKG_NAME");

/// Run the version command
pub async fn run() -> CliResult<()> {
    output::header("dbmigrate");

    kv("Version", VERSION);
    kv("Binary", NAME);

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);

    let mut providers = Vec::new();

    #[cfg(feature = "postgres")]
    providers.push("postgresql");

    #[cfg(feature = "scylladb")]
    providers.push("scylladb");

    if providers.is_empty() {
        providers.push("none");
    }

    kv("Providers", &providers.join(", "));

    output::newline();
    output::dim(&format!(
        "Migration files: {}",
        dbmigrate_core::DEFAULT_EXTENSIONS
            .iter()
            .map(|ext| format!("*.{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    Ok(())
}
