//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use vitrine_commerce::catalog::StaticCatalog;
use vitrine_commerce::StoreConfig;

use crate::config::find_config_file;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Store configuration.
    pub config: StoreConfig,
    /// Where the configuration came from, if not the defaults.
    pub config_path: Option<PathBuf>,
    /// Product catalog.
    pub catalog: StaticCatalog,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve_path(&cwd, path)),
            // Try to find config in current directory or parent directories
            None => find_config_file(&cwd),
        };

        let config = match &config_path {
            Some(path) => {
                output.debug(&format!("Using config {}", path.display()));
                StoreConfig::load(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?
            }
            None => {
                output.debug("No config file found, using defaults");
                StoreConfig::default()
            }
        };

        let catalog = StaticCatalog::seeded().context("Failed to load bundled catalog")?;
        tracing::debug!(products = catalog.len(), "catalog loaded");

        Ok(Self {
            config,
            config_path,
            catalog,
            output,
            cwd,
        })
    }
}

/// Resolve a path relative to the working directory.
fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
