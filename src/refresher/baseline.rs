//! # Dataset Base
//! src/refresher/baseline.rs
//!
//! Estado canónico de la colección `books`. Se embebe en el binario desde
//! `data/books.json`, se valida una sola vez al arrancar y después solo se
//! clona hacia el store en cada reset.

use crate::books::{Book, BookError};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

const EMBEDDED_BOOKS: &str = include_str!("../../data/books.json");

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("baseline is not a valid JSON object of books: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("baseline book {id:?} is invalid: {source}")]
    InvalidBook {
        id: String,
        #[source]
        source: BookError,
    },
}

/// Conjunto inmutable de libros normalizados
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    entries: Vec<(String, Value)>,
}

impl Baseline {
    /// Parsea un objeto JSON `id → libro`
    ///
    /// Cada libro pasa por `Book` y vuelve a `Value`, de modo que el payload
    /// guardado tiene la misma forma que el de un `PUT` equivalente.
    pub fn from_json(raw: &str) -> Result<Self, BaselineError> {
        let books: BTreeMap<String, Book> = serde_json::from_str(raw)?;

        let mut entries = Vec::with_capacity(books.len());
        for (id, book) in books {
            if let Err(source) = book.validate() {
                return Err(BaselineError::InvalidBook { id, source });
            }
            let payload = serde_json::to_value(&book)?;
            entries.push((id, payload));
        }

        Ok(Self { entries })
    }

    /// El dataset compilado dentro del binario
    pub fn embedded() -> Result<Self, BaselineError> {
        Self::from_json(EMBEDDED_BOOKS)
    }

    /// Copia de las entradas, en orden de clave
    pub fn entries(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        self.entries.iter().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
