//! # Store Compartido
//! src/store/shared.rs
//!
//! Un único `RwLock` protege todo el store. Lecturas (`list`, `get`) toman
//! el lock compartido; `put`, `delete`, `reload` y `update` el exclusivo.
//! Un `put` y su barrido de desalojo ocurren dentro del mismo guard, así que
//! ningún lector ve el store por encima del tope.

use super::ordered::OrderedBoundedStore;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Handle clonable al store de la aplicación
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<OrderedBoundedStore>>,
}

impl SharedStore {
    pub fn new(max_entries: usize) -> Self {
        Self::from_store(OrderedBoundedStore::new(max_entries))
    }

    pub fn from_store(store: OrderedBoundedStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Lock compartido; el guard debe vivir solo lo que dura una operación
    pub fn read(&self) -> RwLockReadGuard<'_, OrderedBoundedStore> {
        self.inner.read()
    }

    /// Lock exclusivo
    pub fn write(&self) -> RwLockWriteGuard<'_, OrderedBoundedStore> {
        self.inner.write()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.read().max_entries()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::from_store(OrderedBoundedStore::default())
    }
}
