use std::sync::{Arc, PoisonError, RwLock};

use crate::CatalogIndex;

/// Shared slot holding the current [`CatalogIndex`] snapshot.
///
/// Readers clone the `Arc` and keep using that snapshot for as long as they
/// like; a rebuild builds a fresh index off to the side and swaps it in. The
/// lock is held only for the pointer copy, so readers never see a torn index.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<CatalogIndex>>,
}

impl CatalogHandle {
    pub fn new(index: CatalogIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// The fully built index in effect right now.
    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        // A panicking writer can only have been swapping an Arc; the value is intact.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `index` and return the snapshot it replaced.
    pub fn replace(&self, index: CatalogIndex) -> Arc<CatalogIndex> {
        let next = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
