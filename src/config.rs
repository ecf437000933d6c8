//! Catalog and HTTP configuration
//!
//! A catalog is static data: the root URL, the listing levels to descend and
//! the pages whose fields make up a record. It can be loaded from JSON or
//! taken from [`CatalogConfig::autocentrum`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::assembler::PageSpec;
use crate::error::ConfigError;
use crate::hierarchy::HierarchyLevel;
use crate::record::URL_FIELD;

pub const DEFAULT_USER_AGENT: &str = concat!("cardata/", env!("CARGO_PKG_VERSION"));

/// Settings for [`HttpSource`](crate::source::HttpSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub root: Url,
    /// Listing levels from the root down to the leaves.
    pub levels: Vec<HierarchyLevel>,
    /// Pages read per leaf. The first one is the leaf itself.
    pub pages: Vec<PageSpec>,
}

impl CatalogConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Empty("level"));
        }
        if self.pages.is_empty() {
            return Err(ConfigError::Empty("page"));
        }

        for (i, page) in self.pages.iter().enumerate() {
            match (i, &page.derive) {
                (0, Some(_)) => {
                    return Err(ConfigError::Page {
                        page: page.name.clone(),
                        reason: "the leaf page cannot be derived".to_string(),
                    })
                }
                (i, None) if i > 0 => {
                    return Err(ConfigError::Page {
                        page: page.name.clone(),
                        reason: "missing path substitution".to_string(),
                    })
                }
                _ => {}
            }
        }

        let mut seen = HashSet::new();
        for field in self.pages.iter().flat_map(|page| &page.fields) {
            if field.name == URL_FIELD {
                return Err(ConfigError::ReservedField(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
        }

        Ok(())
    }

    /// All field names in record order, `url` first.
    pub fn field_names(&self) -> Vec<&str> {
        std::iter::once(URL_FIELD)
            .chain(
                self.pages
                    .iter()
                    .flat_map(|page| page.fields.iter().map(|f| f.name.as_str())),
            )
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
