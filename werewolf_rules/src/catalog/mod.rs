//! Static character table.
//!
//! The built-in table ships inside the binary as TOML and is parsed once per
//! call to [`RoleCatalog::builtin`]. Catalogs are read-only after loading.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::entities::{CharacterDefinition, Team};

const BUILTIN_ROLES: &str = include_str!("../../data/roles.toml");

/// Errors raised while loading a character table.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed character table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("character id `{0}` is defined more than once")]
    DuplicateId(String),

    #[error("character table is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RoleTable {
    #[serde(default)]
    roles: Vec<CharacterDefinition>,
}

/// Read-only lookup of character definitions, in table order.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    definitions: Vec<CharacterDefinition>,
    index: HashMap<String, usize>,
}

impl RoleCatalog {
    /// Load the table bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_ROLES)
    }

    /// Parse a `[[roles]]` table.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let table: RoleTable = toml::from_str(source)?;
        Self::from_definitions(table.roles)
    }

    /// Build a catalog from already constructed definitions.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = CharacterDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for definition in definitions {
            if catalog.index.contains_key(&definition.id) {
                return Err(CatalogError::DuplicateId(definition.id));
            }
            catalog
                .index
                .insert(definition.id.clone(), catalog.definitions.len());
            catalog.definitions.push(definition);
        }

        if catalog.definitions.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&CharacterDefinition> {
        self.index.get(id).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &CharacterDefinition> {
        self.definitions.iter()
    }

    /// Definitions belonging to `team`.
    pub fn by_team(&self, team: Team) -> impl Iterator<Item = &CharacterDefinition> {
        self.definitions.iter().filter(move |d| d.team == team)
    }

    /// Definitions tagged with an expansion.
    pub fn by_expansion<'a>(
        &'a self,
        expansion: &'a str,
    ) -> impl Iterator<Item = &'a CharacterDefinition> + 'a {
        self.definitions
            .iter()
            .filter(move |d| d.expansion == expansion)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
