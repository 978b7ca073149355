//! # Store de Recursos Versionados
//!
//! Almacenamiento en memoria de la colección `books`:
//!
//! - `entry`: payload + fecha de modificación, fingerprint derivado
//! - `ordered`: mapa ordenado por inserción con tope y desalojo FIFO
//! - `shared`: handle `Arc<RwLock<..>>` compartido entre threads

pub mod entry;
pub mod ordered;
pub mod shared;

pub use entry::ResourceEntry;
pub use ordered::{EntrySummary, OrderedBoundedStore, DEFAULT_MAX_ENTRIES};
pub use shared::SharedStore;
