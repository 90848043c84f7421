//! Importer configuration
//!
//! Configuration can be built in code or read from a TOML file:
//!
//! ```toml
//! import_paths = ["/usr/lib/tessera/imports", "./imports"]
//! builtin_files = ["builtins.qmltypes", "jsroot.qmltypes"]
//! enable_optional_imports = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Settings of an [`Importer`](crate::Importer)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImporterConfig {
    /// Directories searched for modules, in order
    pub import_paths: Vec<PathBuf>,

    /// Type descriptions that make up the builtins
    pub builtin_files: Vec<String>,

    /// Where the builtins are looked for when the import paths lack them
    pub builtin_resource_dir: PathBuf,

    /// Extension of component files found by directory imports
    pub component_extension: String,

    /// Follow `optional import` directives instead of skipping them
    pub enable_optional_imports: bool,

    /// Directory that `:`-prefixed resource paths are mapped onto
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_root: Option<PathBuf>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            import_paths: Vec::new(),
            builtin_files: vec![
                "builtins.qmltypes".to_string(),
                "jsroot.qmltypes".to_string(),
            ],
            builtin_resource_dir: PathBuf::from(":/builtins"),
            component_extension: "qml".to_string(),
            enable_optional_imports: false,
            resource_root: None,
        }
    }
}

impl ImporterConfig {
    /// Configuration searching the given import paths
    pub fn with_import_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            import_paths: paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ImporterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.builtin_files.is_empty() {
            return Err(ConfigError::ValidationError(
                "builtin_files cannot be empty".to_string(),
            ));
        }
        if self.component_extension.is_empty() || self.component_extension.contains('.') {
            return Err(ConfigError::ValidationError(format!(
                "invalid component extension '{}'",
                self.component_extension
            )));
        }
        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImporterConfig::default();
        assert!(config.import_paths.is_empty());
        assert_eq!(config.builtin_files.len(), 2);
        assert_eq!(config.component_extension, "qml");
        assert!(!config.enable_optional_imports);
    }

    #[test]
    fn test_from_str_fills_defaults() {
        let config = ImporterConfig::from_str(
            r#"
import_paths = ["/opt/imports"]
enable_optional_imports = true
"#,
        )
        .unwrap();
        assert_eq!(config.import_paths, vec![PathBuf::from("/opt/imports")]);
        assert!(config.enable_optional_imports);
        assert_eq!(config.builtin_resource_dir, PathBuf::from(":/builtins"));
    }

    #[test]
    fn test_validation() {
        let result = ImporterConfig::from_str("builtin_files = []");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
        let result = ImporterConfig::from_str("component_extension = \".qml\"");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
        let result = ImporterConfig::from_str("import_paths = 3");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        let config = ImporterConfig {
            resource_root: Some(PathBuf::from("/res")),
            ..ImporterConfig::with_import_paths(["/a", "/b"])
        };
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = ImporterConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(matches!(
            ImporterConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::IoError(_))
        ));
    }
}
