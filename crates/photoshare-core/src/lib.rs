//! PhotoShare Core Library
//!
//! Catalog and tagging engine for PhotoShare, a multi-user photo sharing
//! service. The crate is frontend-agnostic: an HTTP layer, a CLI or tests
//! drive the same `PhotoCatalog` over an explicit `Database` handle.
//!
//! # Architecture
//!
//! - `models`: Data structures (Photo, Tag, User, Settings, PhotoList)
//! - `db`: SQLite database layer with DAOs and the search query builder
//! - `services`: Catalog engine, file storage, cleanup queue, importer, settings
//! - `paths`: Path provider abstraction (PathProvider trait)
//! - `utils`: Error handling and utilities
//!
//! # Example
//!
//! ```no_run
//! use photoshare_core::{DefaultPathProvider, PhotoshareCore, AppSettings};
//! use std::sync::Arc;
//!
//! let core = PhotoshareCore::new(Arc::new(DefaultPathProvider::new()), &AppSettings::default()).unwrap();
//! let page = core.catalog.search(1, "red beach").unwrap();
//! println!("{} matches", page.total);
//! ```

pub mod db;
pub mod models;
pub mod paths;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use db::{Database, SearchQuery};
pub use models::{
    AppSettings, Anonymous, Identity, Permissions, Photo, PhotoDetail, PhotoList, PhotoOrder,
    Tag, TagCount, User, PAGE_SIZE,
};
pub use paths::{DefaultPathProvider, PathProvider, SharedPathProvider};
pub use services::{
    CleanupQueue, FileStorage, ImportReport, Importer, PhotoCatalog, PhotoStorage,
    SettingsManager,
};
pub use utils::{AppError, AppResult, CommandError};

use std::sync::Arc;

/// PhotoShare core application context.
///
/// Holds the shared resources a frontend needs.
pub struct PhotoshareCore {
    /// Database connection
    pub db: Arc<Database>,
    /// Path provider for resolving application paths
    pub path_provider: SharedPathProvider,
    /// File storage for uploaded photos
    pub storage: Arc<dyn PhotoStorage>,
    /// Catalog engine
    pub catalog: Arc<PhotoCatalog>,
}

impl PhotoshareCore {
    /// Open the database, create the storage directories and start the
    /// cleanup worker.
    pub fn new(path_provider: SharedPathProvider, settings: &AppSettings) -> AppResult<Self> {
        let db = Database::open_with_provider(path_provider.as_ref())?;
        db.init()?;
        let db = Arc::new(db);

        let thumbnail_size = settings.thumbnail.enabled.then_some(settings.thumbnail.size);
        let storage: Arc<dyn PhotoStorage> = Arc::new(FileStorage::new(
            path_provider.uploads_dir(),
            path_provider.thumbnails_dir(),
            thumbnail_size,
        )?);

        let catalog = Arc::new(PhotoCatalog::new(db.clone(), storage.clone()));

        Ok(Self {
            db,
            path_provider,
            storage,
            catalog,
        })
    }

    /// Build an importer sharing this context's catalog and storage.
    pub fn importer(&self, settings: &AppSettings) -> Importer {
        Importer::new(self.catalog.clone(), self.storage.clone(), settings.import.clone())
    }
}
