// ⚙️ Catalog policy

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Maximum number of resident vehicles; `None` means unbounded
    pub capacity: Option<usize>,
    /// Whether two vehicles may share the same make and model
    pub allow_duplicates: bool,
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            capacity: None,
            allow_duplicates: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.capacity, None);
        assert!(config.allow_duplicates);
    }

    #[test]
    fn test_builder() {
        let config = CatalogConfig::new().with_capacity(10).with_allow_duplicates(false);
        assert_eq!(config.capacity, Some(10));
        assert!(!config.allow_duplicates);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: CatalogConfig = serde_json::from_str(r#"{"capacity": 3}"#).unwrap();
        assert_eq!(config, CatalogConfig::new().with_capacity(3));
    }
}
