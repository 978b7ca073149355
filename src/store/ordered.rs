//! # Store Ordenado y Acotado
//! src/store/ordered.rs
//!
//! Mapa clave → `ResourceEntry` que conserva el orden de inserción y nunca
//! supera `max_entries`. Cuando se pasa del tope se desalojan las entradas
//! más viejas (por orden de inserción, no de última escritura).
//!
//! Este tipo no sabe nada de locks: `SharedStore` lo envuelve en un
//! `RwLock` y cada operación completa ocurre dentro de un guard.

use super::entry::ResourceEntry;
use crate::fingerprint::FingerprintError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// Tope por defecto de la colección
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Una fila de `list()`
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySummary {
    pub key: String,
    pub fingerprint: String,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderedBoundedStore {
    entries: IndexMap<String, ResourceEntry>,
    max_entries: usize,
}

impl OrderedBoundedStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_entries,
        }
    }

    /// Resumen de cada entrada en orden de inserción
    ///
    /// Recalcula el fingerprint de todas las entradas: O(n).
    pub fn list(&self) -> Result<Vec<EntrySummary>, FingerprintError> {
        self.entries
            .iter()
            .map(|(key, entry)| {
                Ok(EntrySummary {
                    key: key.clone(),
                    fingerprint: entry.fingerprint()?,
                    modified_at: entry.modified_at,
                })
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&ResourceEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserta o reemplaza `key` con fecha de modificación = ahora
    ///
    /// Retorna las claves desalojadas por el tope.
    pub fn put(&mut self, key: &str, payload: Value) -> Vec<String> {
        self.put_at(key, payload, Utc::now())
    }

    /// Como `put` pero con fecha explícita
    ///
    /// Una clave existente conserva su posición. El desalojo corre después
    /// de insertar, así que la entrada nueva solo se desaloja a sí misma
    /// cuando el tope es cero.
    pub fn put_at(&mut self, key: &str, payload: Value, at: DateTime<Utc>) -> Vec<String> {
        let entry = ResourceEntry::new(payload, at);
        match self.entries.get_mut(key) {
            Some(existing) => *existing = entry,
            None => {
                self.entries.insert(key.to_string(), entry);
            }
        }
        self.evict_overflow()
    }

    /// Elimina `key`; no hace nada si no existe
    pub fn delete(&mut self, key: &str) -> Option<ResourceEntry> {
        // shift_remove mantiene el orden relativo del resto
        self.entries.shift_remove(key)
    }

    /// Reemplaza todo el contenido por `baseline`
    ///
    /// Las claves quedan en orden lexicográfico y todas con fecha `at`.
    /// Retorna las claves que no cupieron bajo el tope.
    pub fn reload<I>(&mut self, baseline: I, at: DateTime<Utc>) -> Vec<String>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut pairs: Vec<(String, Value)> = baseline.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        self.entries = pairs
            .into_iter()
            .map(|(key, payload)| (key, ResourceEntry::new(payload, at)))
            .collect();

        self.evict_overflow()
    }

    /// Aplica `f` al payload de `key` y refresca su fecha
    ///
    /// El orden no cambia. Retorna `false` si la clave no existe.
    pub fn update<F>(&mut self, key: &str, at: DateTime<Utc>, f: F) -> bool
    where
        F: FnOnce(&mut Value),
    {
        match self.entries.get_mut(key) {
            Some(entry) => {
                f(&mut entry.payload);
                entry.modified_at = at;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Claves en orden de inserción
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn evict_overflow(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.entries.len() > self.max_entries {
            match self.entries.shift_remove_index(0) {
                Some((key, _)) => evicted.push(key),
                None => break,
            }
        }
        evicted
    }
}

impl Default for OrderedBoundedStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
