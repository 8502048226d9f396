//! Shared, atomically swappable pointer to the active catalog.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::info;

use crate::checks::CheckRegistry;
use crate::loader::{CatalogSource, Result};

use super::{Catalog, CatalogOptions};

/// Owns the active [`Catalog`] and knows how to rebuild it.
///
/// [`current`](Self::current) is a lock-free pointer load. Rebuilds
/// construct a complete new catalog first and then swap it in, so readers
/// see either the old catalog or the new one, never a mix.
#[derive(Debug)]
pub struct CatalogHandle {
    current: ArcSwap<Catalog>,
    source: CatalogSource,
    registry: Arc<CheckRegistry>,
    options: CatalogOptions,
    /// Serializes rebuilds so generations stay in order.
    reload_lock: Mutex<()>,
}

impl CatalogHandle {
    /// Load `source` and build the first catalog (generation 1).
    pub fn load(source: CatalogSource, registry: CheckRegistry, options: CatalogOptions) -> Result<Self> {
        let registry = Arc::new(registry);
        let loaded = source.load()?;
        let catalog = Catalog::build(&loaded, Arc::clone(&registry), &options, 1)?;
        info!(source = %source.describe(), "rule catalog loaded");

        Ok(Self {
            current: ArcSwap::from_pointee(catalog),
            source,
            registry,
            options,
            reload_lock: Mutex::new(()),
        })
    }

    /// Snapshot of the active catalog. Holding it pins that version.
    pub fn current(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// Re-read the source and swap in a freshly built catalog.
    ///
    /// On error the active catalog is left untouched.
    pub fn reload(&self) -> Result<Arc<Catalog>> {
        let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());
        let generation = self.current.load().generation() + 1;

        let loaded = self.source.load()?;
        let catalog = Arc::new(Catalog::build(
            &loaded,
            Arc::clone(&self.registry),
            &self.options,
            generation,
        )?);
        self.current.store(Arc::clone(&catalog));
        Ok(catalog)
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn options(&self) -> CatalogOptions {
        self.options
    }
}
