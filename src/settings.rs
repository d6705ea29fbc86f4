//! Parser settings files.
//!
//! A settings file describes one parser instance:
//!
//! ```yaml
//! packages:
//!   - base
//!   - name: ams
//!     priority: 3
//! parsers: [tex]
//! options:
//!   tags: ams
//! ```
//!
//! Files ending in `.json` are read as JSON; `.yaml` and `.yml` as YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigurationRegistry, DEFAULT_PARSER};
use crate::engine::Engine;
use crate::errors::{ConfigError, ConfigResult};
use crate::options::OptionTree;
use crate::runtime::{PackageRequest, ParserConfiguration, PreparedConfiguration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserSettings {
    /// Packages to select, in request order.
    pub packages: Vec<PackageRequest>,
    /// Parser targets packages may extend.
    pub parsers: Vec<String>,
    /// User options applied over the merged defaults.
    pub options: OptionTree,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            parsers: vec![DEFAULT_PARSER.to_string()],
            options: OptionTree::new(),
        }
    }
}

impl ParserSettings {
    /// Reads settings from a YAML or JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed: Result<Self, String> = if is_json {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Settings {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Folds the selected packages and runs their init hooks.
    pub fn prepare(&self, registry: &ConfigurationRegistry) -> ConfigResult<PreparedConfiguration> {
        PreparedConfiguration::for_parsers(registry, self.packages.iter().cloned(), &self.parsers)
    }

    /// A reference engine carrying these settings' user options.
    pub fn engine(&self) -> Engine {
        Engine::with_user_options(self.options.clone())
    }

    /// Prepares and configures a parser against a fresh reference engine.
    pub fn resolve(
        &self,
        registry: &ConfigurationRegistry,
    ) -> ConfigResult<(ParserConfiguration, Engine)> {
        let mut engine = self.engine();
        let parser = self.prepare(registry)?.configure(&mut engine)?;
        Ok((parser, engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn yaml_settings_accept_both_request_forms() {
        let file = write(
            ".yaml",
            "packages:\n  - base\n  - name: ams\n    priority: 3\noptions:\n  tags: ams\n",
        );
        let settings = ParserSettings::from_path(file.path()).unwrap();
        assert_eq!(
            settings.packages,
            [PackageRequest::new("base"), PackageRequest::with_priority("ams", 3)]
        );
        assert_eq!(settings.parsers, ["tex"]);
        assert_eq!(settings.options.get("tags"), Some(&serde_json::json!("ams")));
    }

    #[test]
    fn json_settings_are_read_by_extension() {
        let file = write(".json", r#"{"packages": ["base"], "parsers": ["tex", "mathml"]}"#);
        let settings = ParserSettings::from_path(file.path()).unwrap();
        assert_eq!(settings.parsers, ["tex", "mathml"]);
    }

    #[test]
    fn unknown_fields_are_settings_errors() {
        let file = write(".yml", "package: [base]\n");
        let err = ParserSettings::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Settings { .. }));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let err = ParserSettings::from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
