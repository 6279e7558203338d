use std::sync::Arc;

use storage::StorageConfig;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog::CatalogService;
use crate::error::AppServicesError;
use crate::quiz::QuizService;

/// Assembles the app-facing services over one storage instance.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    quiz: Arc<QuizService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        config: &StorageConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite_with(config).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over an already constructed storage bundle.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&storage.topics),
            Arc::clone(&storage.questions),
        ));
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.topics),
            Arc::clone(&storage.questions),
        ));
        Self { catalog, quiz }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }
}
