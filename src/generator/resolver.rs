//! Maps record fields to TypeScript type names.
//!
//! A [`TypeResolver`] lives for one generation run. It memoizes every record it
//! has resolved, tracks the records currently being resolved so reference
//! cycles terminate, and synthesizes enum aliases for `enum`-annotated fields.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::schema::{
    to_camel_case, BuiltinTypes, EnumConstant, EnumKind, EnumLiteral, FieldDescriptor,
    RecordDescriptor,
};
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Severity};
use crate::metadata::{
    bare_name, normalize_signature, reduce_signature, strip_indirection, strip_namespaces,
    FieldKind, FieldMeta, RecordType, INTEGER_TYPES,
};

/// Fallback type for anything without a concrete rendering
pub const ANY: &str = "any";

/// Everything one resolution pass produced
#[derive(Debug, Clone, Default)]
pub struct ResolvedSchema {
    pub records: BTreeMap<String, RecordDescriptor>,
    pub enums: BTreeMap<String, EnumConstant>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedSchema {
    /// Names referenced by field types that have no declaration of their own.
    pub fn leftovers(&self, builtins: &BuiltinTypes, config: &GeneratorConfig) -> BTreeSet<String> {
        self.records
            .values()
            .filter(|record| !config.is_internal_marker(&record.name))
            .flat_map(|record| record.fields.iter())
            .map(|field| field.ty.trim())
            .filter(|ty| {
                !ty.is_empty()
                    && !builtins.is_builtin_value(ty)
                    && !self.enums.contains_key(*ty)
                    && !self.records.contains_key(*ty)
            })
            .map(str::to_string)
            .collect()
    }
}

pub struct TypeResolver<'a> {
    config: &'a GeneratorConfig,
    builtins: &'a BuiltinTypes,
    /// Known handles by name; resolved on first reference
    catalog: BTreeMap<String, RecordType>,
    records: BTreeMap<String, RecordDescriptor>,
    in_progress: BTreeSet<String>,
    enums: BTreeMap<String, EnumConstant>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(config: &'a GeneratorConfig, builtins: &'a BuiltinTypes) -> Self {
        TypeResolver {
            config,
            builtins,
            catalog: BTreeMap::new(),
            records: BTreeMap::new(),
            in_progress: BTreeSet::new(),
            enums: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Make a handle known without resolving it.
    pub fn define(&mut self, record: RecordType) {
        if record.name.trim().is_empty() {
            return;
        }
        self.catalog.entry(record.name.clone()).or_insert(record);
    }

    /// Resolve a record and everything reachable from it; returns its type name.
    pub fn resolve(&mut self, record: &RecordType) -> String {
        let name = record.name.trim();
        if name.is_empty() {
            self.diagnostics.push(
                Diagnostic::new(
                    "record:<unnamed>",
                    Severity::Warning,
                    "empty_name",
                    "record handle has no name and was skipped",
                )
                .with_suggestion("give the record a non-empty name"),
            );
            return ANY.to_string();
        }
        if self.records.contains_key(name) || self.in_progress.contains(name) {
            return name.to_string();
        }

        self.catalog
            .entry(name.to_string())
            .or_insert_with(|| record.clone());
        self.in_progress.insert(name.to_string());

        let fields: Vec<FieldDescriptor> = record
            .fields
            .iter()
            .filter_map(|field| self.resolve_field(name, field))
            .collect();

        self.in_progress.remove(name);
        debug!(record = name, fields = fields.len(), "resolved record");
        self.records.insert(
            name.to_string(),
            RecordDescriptor {
                name: name.to_string(),
                doc: record.doc.clone(),
                fields,
            },
        );
        name.to_string()
    }

    pub fn descriptor(&self, name: &str) -> Option<&RecordDescriptor> {
        self.records.get(name)
    }

    /// Close the run. Enum aliases that collide with a record name are
    /// reported as errors; names left to `any` aliases are reported as info.
    pub fn finish(self) -> ResolvedSchema {
        let mut schema = ResolvedSchema {
            records: self.records,
            enums: self.enums,
            diagnostics: self.diagnostics,
        };

        let clashes: Vec<(String, String)> = schema
            .enums
            .values()
            .filter(|constant| schema.records.contains_key(&constant.name))
            .map(|constant| {
                let origin = format!("{}.{}", constant.record, constant.field);
                (constant.name.clone(), origin)
            })
            .collect();
        for (name, origin) in clashes {
            warn!(name = %name, field = %origin, "enum alias collides with a record");
            schema.diagnostics.push(
                Diagnostic::new(
                    format!("record:{origin}"),
                    Severity::Error,
                    "name_clash",
                    format!("enum alias `{name}` has the same name as a record"),
                )
                .with_suggestion("rename the record or the enum-annotated field"),
            );
        }

        for name in schema.leftovers(self.builtins, self.config) {
            schema.diagnostics.push(Diagnostic::new(
                format!("type:{name}"),
                Severity::Info,
                "any_alias",
                format!("`{name}` has no record metadata and is declared as `any`"),
            ));
        }
        schema
    }

    fn resolve_field(&mut self, owner: &str, field: &FieldMeta) -> Option<FieldDescriptor> {
        let key = field.serialization_key()?;
        let annotations = &field.annotations;

        let (ty, enum_values) = match annotations.enum_constraint() {
            Some(raw) => {
                let constant = self.synthesize_enum(owner, field, raw);
                (constant.name.clone(), constant.values.clone())
            }
            None => (self.resolve_signature(field), Vec::new()),
        };

        Some(FieldDescriptor {
            name: field.name.clone(),
            key,
            description: annotations.description().map(str::to_string),
            required: annotations.is_required(),
            default: annotations.storage_default(),
            max_length: annotations.max_length(),
            enum_values,
            ty,
        })
    }

    fn synthesize_enum(&mut self, owner: &str, field: &FieldMeta, raw: &str) -> &EnumConstant {
        let name = format!("{owner}{}", to_camel_case(&field.name));
        if !self.enums.contains_key(&name) {
            let reduced = reduce_signature(&field.signature);
            let kind = if INTEGER_TYPES.contains(&reduced.as_str()) {
                EnumKind::Numeric
            } else {
                EnumKind::Text
            };

            let mut values = Vec::new();
            for literal in raw.split('|').map(str::trim).filter(|s| !s.is_empty()) {
                match kind {
                    EnumKind::Text => values.push(EnumLiteral::Text(literal.to_string())),
                    EnumKind::Numeric => match literal.parse::<i128>() {
                        Ok(n) => values.push(EnumLiteral::Number(n)),
                        Err(_) => {
                            warn!(
                                record = owner,
                                field = %field.name,
                                literal,
                                "dropping non-numeric enum literal"
                            );
                            self.diagnostics.push(Diagnostic::new(
                                format!("record:{owner}.{}", field.name),
                                Severity::Warning,
                                "enum_value",
                                format!("`{literal}` is not a numeric literal for `{reduced}`"),
                            ));
                        }
                    },
                }
            }

            let description = field
                .annotations
                .description()
                .map(str::to_string)
                .unwrap_or_else(|| field.name.clone());
            self.enums.insert(
                name.clone(),
                EnumConstant {
                    record: owner.to_string(),
                    field: field.name.clone(),
                    name: name.clone(),
                    kind,
                    values,
                    description,
                },
            );
        }
        &self.enums[&name]
    }

    fn resolve_signature(&mut self, field: &FieldMeta) -> String {
        let normalized = normalize_signature(&field.signature);
        let unqualified = strip_namespaces(&normalized);
        if let Some(ts) = self
            .builtins
            .lookup(&normalized)
            .or_else(|| self.builtins.lookup(&unqualified))
        {
            return ts.to_string();
        }

        let stripped = strip_indirection(&unqualified);
        let bare = bare_name(&stripped).to_string();
        if let Some(ts) = self
            .builtins
            .lookup(&stripped)
            .or_else(|| self.builtins.lookup(&bare))
        {
            return ts.to_string();
        }

        if self.config.is_opaque(&bare) || self.config.is_internal_marker(&bare) {
            return ANY.to_string();
        }
        if field.carries_object_metadata() && self.config.is_inline_opaque(&bare) {
            return ANY.to_string();
        }

        let kind = match field.kind {
            FieldKind::Pointer => FieldKind::infer(&stripped),
            other => other,
        };
        match kind {
            FieldKind::Struct | FieldKind::Pointer => self.resolve_named(&bare, field),
            FieldKind::Scalar | FieldKind::Slice | FieldKind::Map | FieldKind::Dynamic => {
                ANY.to_string()
            }
        }
    }

    fn resolve_named(&mut self, name: &str, field: &FieldMeta) -> String {
        if name.is_empty() {
            return ANY.to_string();
        }
        if self.records.contains_key(name) || self.in_progress.contains(name) {
            return name.to_string();
        }
        if let Some(record) = self.catalog.get(name).cloned() {
            return self.resolve(&record);
        }
        if let Some(handle) = field.nested {
            return self.resolve(&handle());
        }
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DESCRIPTION_KEY, ENUM_KEY, JSON_KEY};

    fn leaf() -> RecordType {
        RecordType::new("Leaf").field(FieldMeta::new("value", "String"))
    }

    #[test]
    fn test_resolve_builtins_and_pointers() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        let record = RecordType::new("Sample")
            .field(FieldMeta::new("created", "chrono::DateTime<chrono::Utc>"))
            .field(FieldMeta::new("count", "Option<u64>"))
            .field(FieldMeta::new("labels", "HashMap<String, String>"))
            .field(FieldMeta::new("tags", "Vec<String>"))
            .field(FieldMeta::new("blobs", "Vec<Leaf>"))
            .field(FieldMeta::new("leaf", "Option<Box<Leaf>>").nested(leaf));
        assert_eq!(resolver.resolve(&record), "Sample");
        let schema = resolver.finish();

        let types: Vec<_> = schema.records["Sample"]
            .fields
            .iter()
            .map(|f| f.ty.as_str())
            .collect();
        assert_eq!(
            types,
            vec!["string", "number", "{[key: string]: string}", "string[]", "any", "Leaf"]
        );
        assert!(schema.records.contains_key("Leaf"));
    }

    #[test]
    fn test_cycle_terminates() {
        fn node() -> RecordType {
            RecordType::new("Node")
                .field(FieldMeta::new("next", "Option<Box<Node>>").nested(node))
                .field(FieldMeta::new("parent", "Option<Box<Node>>").nested(node))
        }
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        assert_eq!(resolver.resolve(&node()), "Node");
        let schema = resolver.finish();
        assert_eq!(schema.records.len(), 1);
        assert_eq!(schema.records["Node"].fields[0].ty, "Node");
    }

    #[test]
    fn test_numeric_enum_drops_bad_literals() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        let record = RecordType::new("Account").field(
            FieldMeta::new("status", "u8")
                .annotate(ENUM_KEY, "1|0|x")
                .annotate(DESCRIPTION_KEY, "account status"),
        );
        resolver.resolve(&record);
        let schema = resolver.finish();
        let constant = &schema.enums["AccountStatus"];
        assert_eq!(constant.kind, EnumKind::Numeric);
        assert_eq!(constant.union(), "1|0");
        assert_eq!(constant.description, "account status");
        assert_eq!(schema.diagnostics.len(), 1);
        assert_eq!(schema.diagnostics[0].kind, "enum_value");
    }

    #[test]
    fn test_opaque_and_leftovers() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        let record = RecordType::new("Review")
            .field(FieldMeta::new("spec", "TokenReviewSpec"))
            .field(FieldMeta::new("meta", "ObjectMeta").annotate(JSON_KEY, "metadata,omitempty"))
            .field(FieldMeta::new("owner", "external::Owner"))
            .field(FieldMeta::new("secret", "String").annotate(JSON_KEY, "-"));
        resolver.resolve(&record);
        let schema = resolver.finish();
        let fields = &schema.records["Review"].fields;
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].ty, "any");
        assert_eq!(fields[1].ty, "any");
        assert_eq!(fields[1].key, "metadata");
        assert_eq!(fields[2].ty, "Owner");

        let leftovers = schema.leftovers(&builtins, &config);
        assert_eq!(leftovers.into_iter().collect::<Vec<_>>(), vec!["Owner".to_string()]);
    }

    #[test]
    fn test_empty_name_is_diagnosed() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        assert_eq!(resolver.resolve(&RecordType::new("")), "any");
        let schema = resolver.finish();
        assert!(schema.records.is_empty());
        assert_eq!(schema.diagnostics[0].kind, "empty_name");
    }

    #[test]
    fn test_wide_numeric_enum_literals() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        let record = RecordType::new("Quota")
            .field(FieldMeta::new("limit", "u64").annotate(ENUM_KEY, "0|18446744073709551615"));
        resolver.resolve(&record);
        let schema = resolver.finish();
        assert_eq!(schema.enums["QuotaLimit"].union(), "0|18446744073709551615");
        assert!(schema.diagnostics.is_empty());
    }

    #[test]
    fn test_enum_alias_clashing_with_record() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        let account = RecordType::new("Account")
            .field(FieldMeta::new("role", "String").annotate(ENUM_KEY, "a|b"));
        resolver.resolve(&account);
        resolver.resolve(&RecordType::new("AccountRole").field(FieldMeta::new("id", "u32")));
        let schema = resolver.finish();

        assert_eq!(schema.diagnostics.len(), 1);
        let clash = &schema.diagnostics[0];
        assert_eq!(clash.severity, Severity::Error);
        assert_eq!(clash.kind, "name_clash");
        assert_eq!(clash.location, "record:Account.role");
    }

    #[test]
    fn test_any_alias_is_reported() {
        let config = GeneratorConfig::default();
        let builtins = BuiltinTypes::default();
        let mut resolver = TypeResolver::new(&config, &builtins);
        resolver.resolve(&RecordType::new("Deploy").field(FieldMeta::new("spec", "k8s::PodSpec")));
        let schema = resolver.finish();

        assert_eq!(schema.diagnostics.len(), 1);
        assert_eq!(schema.diagnostics[0].severity, Severity::Info);
        assert_eq!(schema.diagnostics[0].kind, "any_alias");
        assert_eq!(schema.diagnostics[0].location, "type:PodSpec");
    }
}
