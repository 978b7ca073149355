//! # Tipos de la Colección Books
//! src/books/types.rs
//!
//! El store guarda `serde_json::Value`; estos tipos solo se usan en el borde
//! de los handlers para validar lo que entra y dar forma a lo que sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calificación puntual de un libro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub date: DateTime<Utc>,
    pub rating: f64,
}

/// Metadatos de un libro y sus calificaciones
///
/// Los campos opcionales vacíos no se serializan, de modo que el mismo libro
/// siempre produce el mismo documento (y el mismo fingerprint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub ratings: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_average: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_ratings: Vec<Rating>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Un libro que parsea pero no es aceptable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("{field} must be between 0 and 5")]
    RatingOutOfRange { field: &'static str },
}

impl Book {
    pub fn validate(&self) -> Result<(), BookError> {
        if self.title.trim().is_empty() {
            return Err(BookError::EmptyTitle);
        }
        if let Some(avg) = self.rating_average {
            if !in_rating_range(avg) {
                return Err(BookError::RatingOutOfRange { field: "rating_average" });
            }
        }
        if self.recent_ratings.iter().any(|r| !in_rating_range(r.rating)) {
            return Err(BookError::RatingOutOfRange { field: "recent_ratings.rating" });
        }
        Ok(())
    }
}

fn in_rating_range(value: f64) -> bool {
    value.is_finite() && (0.0..=5.0).contains(&value)
}

/// Fila de `GET /books`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub url: String,
    pub version: String,
    pub modified: DateTime<Utc>,
}
