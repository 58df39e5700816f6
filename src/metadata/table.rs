//! Serialized form of record and route metadata.
//!
//! A schema table lets hosts that cannot link against this crate (or build
//! scripts that only have a metadata dump) drive the generator:
//!
//! ```yaml
//! records:
//!   - name: Account
//!     doc: System account
//!     fields:
//!       - name: id
//!         signature: u32
//!         annotations: { json: id, validate: required }
//! definitions: []
//! routes:
//!   - method: GET
//!     path: /accounts/{id}
//!     operation: account
//!     tags: [account-api]
//!     parameters:
//!       - { name: id, data_type: number, location: path, required: true }
//!     responses:
//!       - { code: 200, message: OK, model: Account }
//! ```

use anyhow::{anyhow, bail, Context};
use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::route::{Parameter, Route};
use super::types::{Annotations, FieldKind, FieldMeta, RecordType};
use crate::config::GeneratorConfig;
use crate::generator::Generator;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaTable {
    /// Records that are always emitted
    pub records: Vec<RecordEntry>,
    /// Records emitted only when referenced
    pub definitions: Vec<RecordEntry>,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordEntry {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    pub signature: String,
    #[serde(default)]
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEntry {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub reads: Option<String>,
    #[serde(default)]
    pub writes: Option<String>,
    #[serde(default)]
    pub responses: Vec<ResponseEntry>,
}

impl From<&RecordEntry> for RecordType {
    fn from(entry: &RecordEntry) -> Self {
        let mut record = RecordType::new(entry.name.clone());
        if let Some(doc) = &entry.doc {
            record = record.with_doc(doc.clone());
        }
        for field in &entry.fields {
            let mut meta = FieldMeta::new(field.name.clone(), field.signature.clone());
            if let Some(kind) = field.kind {
                meta = meta.kind(kind);
            }
            meta.annotations = field.annotations.clone();
            record = record.field(meta);
        }
        record
    }
}

impl SchemaTable {
    /// Load a table from YAML (`.yaml`/`.yml`) or JSON (anything else).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema table {}", path.display()))?;
        let is_yaml = path
            .extension()
            .map(|s| s == "yaml" || s == "yml")
            .unwrap_or(false);
        let table = if is_yaml {
            serde_yaml::from_str(&source)?
        } else {
            serde_json::from_str(&source)?
        };
        Ok(table)
    }

    pub fn from_yaml_str(source: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Every record handle in the table, keyed by name.
    fn catalog(&self) -> BTreeMap<String, RecordType> {
        self.records
            .iter()
            .chain(self.definitions.iter())
            .map(|entry| (entry.name.clone(), RecordType::from(entry)))
            .collect()
    }

    /// Build a generator with every record, definition and route registered.
    ///
    /// # Errors
    ///
    /// Returns an error when a route uses an unknown HTTP method or references
    /// a model name the table does not define.
    pub fn into_generator(self, config: GeneratorConfig) -> anyhow::Result<Generator> {
        let catalog = self.catalog();
        let lookup = |name: &str| -> anyhow::Result<RecordType> {
            catalog
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("unknown model `{name}` referenced by a route"))
        };

        let mut generator = Generator::new(config);
        for entry in &self.definitions {
            generator.define_type(RecordType::from(entry));
        }
        for entry in &self.records {
            generator.register_type(RecordType::from(entry));
        }
        for entry in self.routes {
            let method = Method::from_bytes(entry.method.to_uppercase().as_bytes())
                .map_err(|_| anyhow!("invalid HTTP method `{}`", entry.method))?;
            if entry.path.trim().is_empty() {
                bail!("route `{}` has an empty path", entry.method);
            }
            let mut route = Route::new(method, entry.path)
                .operation(entry.operation)
                .doc(entry.doc)
                .notes(entry.notes);
            route.tags = entry.tags;
            route.metadata = entry.metadata;
            route.parameters = entry.parameters;
            if let Some(name) = entry.reads.as_deref() {
                route = route.reads_type(lookup(name)?);
            }
            if let Some(name) = entry.writes.as_deref() {
                route = route.writes_type(lookup(name)?);
            }
            for response in entry.responses {
                let model = response.model.as_deref().map(lookup).transpose()?;
                route = route.returns(response.code, response.message, model);
            }
            generator.register_route(route);
        }
        Ok(generator)
    }
}
