//! Logging setup and step banners

use crate::config::SuiteConfig;
use ftest_core::Result;
use std::cell::Cell;
use tracing::info;

/// Install a fmt subscriber capped at `level`
///
/// Safe to call from every test: only the first call installs anything.
pub fn init_logging(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Install a fmt subscriber at the suite's configured `log_level`
pub fn init_suite_logging(config: &SuiteConfig) -> Result<()> {
    init_logging(config.level()?);
    Ok(())
}

/// Numbered step log for one test case
pub struct Steps {
    case: &'static str,
    next: Cell<usize>,
}

impl Steps {
    /// Step log for `case`, numbering from 1
    pub fn new(case: &'static str) -> Self {
        Steps {
            case,
            next: Cell::new(1),
        }
    }

    /// Log the next step
    pub fn log(&self, description: &str) {
        let step = self.next.get();
        self.next.set(step + 1);
        info!(case = self.case, step, "==> {}", description);
    }

    /// Number of steps logged so far
    pub fn count(&self) -> usize {
        self.next.get() - 1
    }
}
