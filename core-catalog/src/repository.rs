//! Catalog repository with a lazily populated in-memory cache.

use std::sync::Arc;

use async_trait::async_trait;
use core_async::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::loader::CatalogLoader;
use crate::models::{AudioFile, Category, Grade};
use crate::query;

/// Read access to the lesson catalog.
///
/// Queries on a repository that was never loaded trigger a load first. A
/// failed load is returned to the caller and leaves the repository
/// unloaded; a loaded but empty catalog answers with empty lists.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Scan the asset store and replace the cached catalog.
    async fn load_catalog(&self) -> Result<()>;

    /// Load only if nothing is cached yet.
    async fn ensure_loaded(&self) -> Result<()>;

    async fn is_loaded(&self) -> bool;

    /// Entire catalog in grade, category, unit order.
    async fn all_units(&self) -> Result<Vec<AudioFile>>;

    async fn list_grades(&self) -> Result<Vec<Grade>>;

    async fn list_categories(&self, grade: Grade) -> Result<Vec<Category>>;

    async fn list_units(&self, grade: Grade, category: Category) -> Result<Vec<AudioFile>>;

    async fn find_unit(
        &self,
        grade: Grade,
        category: Category,
        unit_number: u32,
    ) -> Result<Option<AudioFile>>;
}

/// [`CatalogRepository`] backed by a single flat list.
pub struct InMemoryCatalogRepository {
    loader: CatalogLoader,
    cache: RwLock<Option<Arc<Vec<AudioFile>>>>,
}

impl InMemoryCatalogRepository {
    pub fn new(loader: CatalogLoader) -> Self {
        Self {
            loader,
            cache: RwLock::new(None),
        }
    }

    async fn snapshot(&self) -> Result<Arc<Vec<AudioFile>>> {
        if let Some(catalog) = self.cache.read().await.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let mut cache = self.cache.write().await;
        if let Some(catalog) = cache.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        debug!("Catalog not loaded yet, loading on first query");
        let catalog = Arc::new(self.loader.load().await?);
        *cache = Some(Arc::clone(&catalog));
        Ok(catalog)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    #[instrument(skip(self))]
    async fn load_catalog(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        let catalog = self.loader.load().await?;
        *cache = Some(Arc::new(catalog));
        Ok(())
    }

    async fn ensure_loaded(&self) -> Result<()> {
        self.snapshot().await.map(|_| ())
    }

    async fn is_loaded(&self) -> bool {
        self.cache.read().await.is_some()
    }

    async fn all_units(&self) -> Result<Vec<AudioFile>> {
        Ok(self.snapshot().await?.as_ref().clone())
    }

    async fn list_grades(&self) -> Result<Vec<Grade>> {
        Ok(query::grades_in(&self.snapshot().await?))
    }

    async fn list_categories(&self, grade: Grade) -> Result<Vec<Category>> {
        Ok(query::categories_in(&self.snapshot().await?, grade))
    }

    async fn list_units(&self, grade: Grade, category: Category) -> Result<Vec<AudioFile>> {
        Ok(query::units_in(&self.snapshot().await?, grade, category))
    }

    async fn find_unit(
        &self,
        grade: Grade,
        category: Category,
        unit_number: u32,
    ) -> Result<Option<AudioFile>> {
        Ok(query::find_in(
            &self.snapshot().await?,
            grade,
            category,
            unit_number,
        ))
    }
}
