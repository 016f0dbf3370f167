//! Entity catalog.
//!
//! The catalog is the ordered list of entities (parks) the refresh sweep
//! walks. It is loaded from a JSON array:
//!
//! ```json
//! [
//!   { "code": "YELL", "name": "Yellowstone", "latitude": 44.6, "longitude": -110.5 },
//!   { "code": "ZION", "name": "Zion", "latitude": 37.3, "longitude": -113.05 }
//! ]
//! ```
//!
//! Declaration order is preserved and is the sweep's outer-loop order.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an entity code.
pub const MAX_CODE_LEN: usize = 64;

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Codes double as cache directory names, so no separators or dots.
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$").expect("static regex is valid")
    })
}

/// Check whether `code` is a well-formed entity code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() <= MAX_CODE_LEN && code_pattern().is_match(code)
}

/// A single entity whose data is refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Short unique code, e.g. `YELL`.
    pub code: String,
    /// Human-readable name, used to build photo search queries.
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Errors raised while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid entity code '{0}'")]
    InvalidCode(String),

    #[error("Duplicate entity code '{0}'")]
    DuplicateCode(String),
}

/// Ordered, de-duplicated set of entities.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl EntityCatalog {
    /// Build a catalog, validating codes and rejecting duplicates.
    pub fn new(entities: Vec<Entity>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entities.len());
        for (position, entity) in entities.iter().enumerate() {
            if !is_valid_code(&entity.code) {
                return Err(CatalogError::InvalidCode(entity.code.clone()));
            }
            if index.insert(entity.code.clone(), position).is_some() {
                return Err(CatalogError::DuplicateCode(entity.code.clone()));
            }
        }
        Ok(Self { entities, index })
    }

    /// Parse a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entities: Vec<Entity> = serde_json::from_str(json)?;
        Self::new(entities)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn get(&self, code: &str) -> Option<&Entity> {
        self.index.get(code).map(|&i| &self.entities[i])
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entity codes in declaration order.
    pub fn codes(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.code.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
