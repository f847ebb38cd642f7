//! Entry-Point Catalog
//!
//! The catalog maps graphics-API entry points to the linker symbols the
//! traversal starts from. It is loaded once, before any graph analysis, so a
//! malformed document fails fast instead of wasting the expensive graph load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One catalogued entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub symbol: String,
}

/// Ordered collection of entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub mappings: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parse a catalog document. Missing or mistyped fields are an error
    /// here, not later.
    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_json::from_str(text).context("Malformed catalog document")?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Entries selected by position. In range selects exactly one entry;
    /// absent or out of range is equivalent to "no selection" and yields the
    /// whole catalog.
    pub fn select(&self, requested: Option<i64>) -> &[CatalogEntry] {
        match requested {
            Some(i) if i >= 0 && (i as usize) < self.mappings.len() => {
                let i = i as usize;
                &self.mappings[i..=i]
            }
            _ => &self.mappings,
        }
    }
}
