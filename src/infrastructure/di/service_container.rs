//! Service container for dependency injection
//!
//! Wires settings and I/O implementations into the application services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, IngestService};
use crate::config::Settings;
use crate::domain::Forest;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding application settings and I/O dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn ingest_service(&self) -> IngestService {
        IngestService::new(
            Arc::clone(&self.fs),
            self.settings.localized_sections.clone(),
        )
    }

    /// Pick the data file: an explicit path wins over the configured one.
    pub fn resolve_data_file(&self, explicit: Option<&Path>) -> InfraResult<PathBuf> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.settings.data_file.clone())
            .ok_or_else(|| {
                InfraError::Application(ApplicationError::Config {
                    message: "no data file given (use --file or set data_file)".to_string(),
                })
            })?;

        if !self.fs.is_file(&path) {
            return Err(InfraError::DataFileNotFound(path));
        }
        Ok(path)
    }

    /// Resolve the data file and ingest it into a fresh forest.
    #[instrument(level = "debug", skip(self))]
    pub fn load_forest(&self, explicit: Option<&Path>) -> InfraResult<Forest> {
        let path = self.resolve_data_file(explicit)?;
        debug!("load_forest: path={}", path.display());
        Ok(self.ingest_service().load_file(&path)?)
    }
}
