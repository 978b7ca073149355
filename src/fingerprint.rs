//! # Fingerprints (ETags)
//! src/fingerprint.rs
//!
//! Un fingerprint es un token corto y opaco derivado del contenido:
//!
//! ```text
//! valor → MessagePack → XXH3-64 → 8 bytes big-endian → base64 URL-safe sin padding
//! ```
//!
//! MessagePack serializa los structs en el orden de declaración y los mapas
//! de `serde_json` en orden de clave, así que el mismo contenido produce
//! siempre los mismos bytes. Solo se serializa el contenido público: la fecha
//! de modificación viaja aparte en `Last-Modified` y no forma parte del hash.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Serialize;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// El valor no pudo serializarse a su forma canónica
#[derive(Debug, Error)]
#[error("failed to serialize value for fingerprinting: {0}")]
pub struct FingerprintError(#[from] rmp_serde::encode::Error);

/// Calcula el fingerprint de cualquier valor serializable
///
/// # Ejemplo
/// ```
/// use apibin::fingerprint::fingerprint;
/// use serde_json::json;
///
/// let a = fingerprint(&json!({"title": "Dune", "author": "Frank Herbert"})).unwrap();
/// let b = fingerprint(&json!({"author": "Frank Herbert", "title": "Dune"})).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 11);
/// ```
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String, FingerprintError> {
    let bytes = rmp_serde::to_vec(value)?;
    Ok(fingerprint_bytes(&bytes))
}

/// Fingerprint de bytes crudos (payloads estáticos)
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let hash = xxh3_64(bytes);
    URL_SAFE_NO_PAD.encode(hash.to_be_bytes())
}
