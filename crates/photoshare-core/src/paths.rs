//! Path provider abstraction.
//!
//! Resolves where the database, uploaded photos, thumbnails, settings and
//! logs live, so the core crate never hard-codes a data directory.

use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "PHOTOSHARE_DATA_DIR";

/// Trait for providing application data paths.
pub trait PathProvider: Send + Sync {
    /// Get the root application data directory.
    fn app_data_dir(&self) -> PathBuf;

    /// Get the database file path.
    fn database_path(&self) -> PathBuf {
        self.app_data_dir().join("Database").join("photoshare.db")
    }

    /// Get the directory holding uploaded originals.
    fn uploads_dir(&self) -> PathBuf {
        self.app_data_dir().join("uploads")
    }

    /// Get the thumbnails directory.
    fn thumbnails_dir(&self) -> PathBuf {
        self.uploads_dir().join("thumbnails")
    }

    /// Get the settings file path.
    fn settings_path(&self) -> PathBuf {
        self.app_data_dir().join("Config").join("settings.json")
    }

    /// Get the logs directory.
    fn logs_dir(&self) -> PathBuf {
        self.app_data_dir().join("Logs")
    }
}

/// Shared reference to a PathProvider implementation.
pub type SharedPathProvider = Arc<dyn PathProvider>;

/// Default provider: `$PHOTOSHARE_DATA_DIR`, else the platform data dir.
#[derive(Debug, Clone)]
pub struct DefaultPathProvider {
    app_data_dir: PathBuf,
}

impl DefaultPathProvider {
    pub fn new() -> Self {
        let app_data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("PhotoShare")
            });
        Self { app_data_dir }
    }

    /// Create a provider with a custom base directory.
    ///
    /// Useful for testing.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            app_data_dir: base_dir,
        }
    }
}

impl Default for DefaultPathProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PathProvider for DefaultPathProvider {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data_dir.clone()
    }
}
