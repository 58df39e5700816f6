//! Generator configuration.
//!
//! Loaded from YAML (`.yaml`/`.yml`/`.json`) or TOML (`.toml`). Every key is
//! optional:
//!
//! ```yaml
//! function_name_key: x-function-name
//! default_group: api
//! request_import: "@/utils/request"
//! route_template: templates/my_stub.ts.j2
//! builtin_types:
//!   Decimal: string
//! opaque_types: [TokenReviewSpec, TokenReviewStatus]
//! inline_opaque_types: [TypeMeta, ObjectMeta]
//! internal_markers: [PhantomData]
//! date_prefix: true
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::generator::DEFAULT_ROUTE_TEMPLATE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Route metadata key holding an explicit client function name
    pub function_name_key: String,
    /// Group used for routes without tags
    pub default_group: String,
    /// Module the emitted stubs import `request` from
    pub request_import: String,
    /// Custom minijinja template for route stubs
    pub route_template: Option<PathBuf>,
    /// Extra or overriding built-in mappings (signature → TypeScript type)
    pub builtin_types: BTreeMap<String, String>,
    /// Foreign types always emitted as `any`
    pub opaque_types: Vec<String>,
    /// Types emitted as `any` when embedded inline or keyed `metadata`
    pub inline_opaque_types: Vec<String>,
    /// Marker records that are never declared
    pub internal_markers: Vec<String>,
    /// Prefix output files with the current date
    pub date_prefix: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            function_name_key: "x-function-name".to_string(),
            default_group: "api".to_string(),
            request_import: "@/utils/request".to_string(),
            route_template: None,
            builtin_types: BTreeMap::new(),
            opaque_types: vec!["TokenReviewSpec".to_string(), "TokenReviewStatus".to_string()],
            inline_opaque_types: vec!["TypeMeta".to_string(), "ObjectMeta".to_string()],
            internal_markers: vec!["PhantomData".to_string()],
            date_prefix: true,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration, choosing the parser by file extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator config: {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let config = match extension {
            "yaml" | "yml" | "json" => serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse generator config: {}", path.display())
            })?,
            "toml" => toml::from_str(&contents).with_context(|| {
                format!("Failed to parse generator config: {}", path.display())
            })?,
            other => bail!(
                "unsupported config format `{other}` for {} (expected yaml, json or toml)",
                path.display()
            ),
        };
        Ok(config)
    }

    /// Source of the route stub template: the configured file or the bundled default.
    pub fn route_template_source(&self) -> anyhow::Result<String> {
        match &self.route_template {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read route template: {}", path.display())),
            None => Ok(DEFAULT_ROUTE_TEMPLATE.to_string()),
        }
    }

    pub(crate) fn is_opaque(&self, name: &str) -> bool {
        self.opaque_types.iter().any(|t| t == name)
    }

    pub(crate) fn is_inline_opaque(&self, name: &str) -> bool {
        self.inline_opaque_types.iter().any(|t| t == name)
    }

    pub(crate) fn is_internal_marker(&self, name: &str) -> bool {
        self.internal_markers.iter().any(|t| t == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.function_name_key, "x-function-name");
        assert_eq!(config.default_group, "api");
        assert!(config.date_prefix);
        assert!(config.is_opaque("TokenReviewSpec"));
        assert!(config.is_inline_opaque("ObjectMeta"));
        assert!(config.is_internal_marker("PhantomData"));
        assert!(config.route_template_source().is_ok());
    }

    #[test]
    fn test_load_yaml_keeps_unset_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "default_group: misc\nbuiltin_types:\n  Decimal: string").unwrap();
        let config = GeneratorConfig::load(file.path()).unwrap();
        assert_eq!(config.default_group, "misc");
        assert_eq!(config.builtin_types.get("Decimal").map(String::as_str), Some("string"));
        assert_eq!(config.request_import, "@/utils/request");
    }

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "date_prefix = false\nopaque_types = [\"Secret\"]").unwrap();
        let config = GeneratorConfig::load(file.path()).unwrap();
        assert!(!config.date_prefix);
        assert_eq!(config.opaque_types, vec!["Secret".to_string()]);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(GeneratorConfig::load(file.path()).is_err());
    }
}
