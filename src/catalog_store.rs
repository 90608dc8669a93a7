use crate::catalog::{build_catalog, Catalog, CatalogOptions};
use crate::file_scanner::FileScanner;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog scan task failed: {0}")]
    ScanTask(#[from] tokio::task::JoinError),
}

/// Holds the current catalog; a reload swaps it wholesale.
#[derive(Clone)]
pub struct CatalogStore {
    catalog: Arc<RwLock<Arc<Catalog>>>,
    scanner: FileScanner,
    options: CatalogOptions,
}

impl CatalogStore {
    /// Scans the photo root once and keeps the result.
    pub fn load(scanner: FileScanner, options: CatalogOptions) -> Self {
        let catalog = build_catalog(&scanner.scan(), &options);
        info!("Catalog loaded with {} images", catalog.len());

        Self::with_catalog(catalog, scanner, options)
    }

    pub fn with_catalog(catalog: Catalog, scanner: FileScanner, options: CatalogOptions) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            scanner,
            options,
        }
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.read().await.clone()
    }

    /// Rescans the photo root and replaces the catalog.
    pub async fn reload(&self) -> Result<Arc<Catalog>, CatalogError> {
        let scanner = self.scanner.clone();
        let options = self.options.clone();
        let catalog = tokio::task::spawn_blocking(move || {
            Arc::new(build_catalog(&scanner.scan(), &options))
        })
        .await?;

        *self.catalog.write().await = catalog.clone();
        info!("Catalog reloaded with {} images", catalog.len());

        Ok(catalog)
    }

    pub fn scanner(&self) -> &FileScanner {
        &self.scanner
    }
}
