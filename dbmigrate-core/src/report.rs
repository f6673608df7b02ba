//! Progress reporting for applied migrations.

use std::io::Write;

/// Receives a notification for each migration that was applied.
pub trait Reporter: Send + Sync {
    /// Called once, right after `name` was applied and recorded.
    fn migrated(&self, name: &str);
}

/// Prints `Migrated <name>` to stdout, one line per migration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn migrated(&self, name: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not fail an already applied migration.
        let _ = writeln!(stdout, "{}", progress_line(name));
        let _ = stdout.flush();
    }
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn migrated(&self, _name: &str) {}
}

impl<F> Reporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn migrated(&self, name: &str) {
        self(name)
    }
}

/// Format the progress line for a migration.
pub fn progress_line(name: &str) -> String {
    format!("Migrated {}", name)
}
