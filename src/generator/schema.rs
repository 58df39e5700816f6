use std::collections::BTreeMap;

use crate::metadata::{normalize_signature, strip_namespaces};

/// Convert snake_case to UpperCamelCase
///
/// # Example
///
/// ```
/// use schemagen::generator::to_camel_case;
/// assert_eq!(to_camel_case("nick_name"), "NickName");
/// assert_eq!(to_camel_case("role"), "Role");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Uppercase the first character only (`listAccounts` → `ListAccounts`).
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A resolved record, ready to be declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub name: String,
    pub doc: Option<String>,
    /// Fields in declaration order, suppressed fields removed
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared field name
    pub name: String,
    /// Serialization key
    pub key: String,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<String>,
    pub max_length: Option<String>,
    pub enum_values: Vec<EnumLiteral>,
    /// Resolved TypeScript type; empty is rendered as `any`
    pub ty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    Text,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumLiteral {
    Text(String),
    Number(i128),
}

impl EnumLiteral {
    /// TypeScript literal: text is single-quoted, numbers are bare.
    pub fn ts_literal(&self) -> String {
        match self {
            EnumLiteral::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            EnumLiteral::Number(n) => n.to_string(),
        }
    }

    /// Raw value as written in the annotation.
    pub fn raw(&self) -> String {
        match self {
            EnumLiteral::Text(s) => s.clone(),
            EnumLiteral::Number(n) => n.to_string(),
        }
    }
}

/// Union alias synthesized for an enum-annotated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    /// Owning record name
    pub record: String,
    pub field: String,
    /// `<Record><UpperCamelField>`
    pub name: String,
    pub kind: EnumKind,
    pub values: Vec<EnumLiteral>,
    pub description: String,
}

impl EnumConstant {
    /// `'a'|'b'`, or `never` when no literal survived parsing.
    pub fn union(&self) -> String {
        if self.values.is_empty() {
            return "never".to_string();
        }
        self.values
            .iter()
            .map(EnumLiteral::ts_literal)
            .collect::<Vec<_>>()
            .join("|")
    }
}

const OBJECT_STRING: &str = "{[key: string]: string}";
const OBJECT_ANY: &str = "{[key: string]: any}";

/// Table of signatures with a fixed TypeScript rendering.
///
/// Keys are normalized signatures without namespaces (`DateTime<Utc>`,
/// `HashMap<String,String>`).
#[derive(Debug, Clone)]
pub struct BuiltinTypes {
    table: BTreeMap<String, String>,
}

impl Default for BuiltinTypes {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        let mut put = |keys: &[&str], ts: &str| {
            for key in keys {
                table.insert((*key).to_string(), ts.to_string());
            }
        };
        put(&["bool"], "boolean");
        put(
            &[
                "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128",
                "isize", "f32", "f64",
            ],
            "number",
        );
        put(&["String", "str", "&str", "char", "Uuid"], "string");
        put(
            &[
                "DateTime<Utc>",
                "DateTime<Local>",
                "DateTime<FixedOffset>",
                "DateTime",
                "NaiveDateTime",
                "NaiveDate",
                "NaiveTime",
                "SystemTime",
                "OffsetDateTime",
                "PrimitiveDateTime",
                "Time",
            ],
            "string",
        );
        put(
            &["HashMap<String,String>", "BTreeMap<String,String>", "JsonMap"],
            OBJECT_STRING,
        );
        put(
            &[
                "HashMap<String,Value>",
                "BTreeMap<String,Value>",
                "Map<String,Value>",
                "HashMap<String,Vec<String>>",
                "BTreeMap<String,Vec<String>>",
            ],
            OBJECT_ANY,
        );
        put(&["Vec<String>", "ArrayString"], "string[]");
        put(
            &[
                "Vec<u16>", "Vec<u32>", "Vec<u64>", "Vec<usize>", "Vec<i16>", "Vec<i32>",
                "Vec<i64>", "Vec<isize>", "ArrayUint",
            ],
            "number[]",
        );
        put(&["Value", "()"], "any");
        BuiltinTypes { table }
    }
}

impl BuiltinTypes {
    /// Default table with `overrides` layered on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut builtins = Self::default();
        for (signature, ts) in overrides {
            let key = strip_namespaces(&normalize_signature(signature));
            builtins.table.insert(key, ts.clone());
        }
        builtins
    }

    pub fn lookup(&self, signature: &str) -> Option<&str> {
        self.table.get(signature).map(String::as_str)
    }

    /// True when `name` is one of the rendered TypeScript types.
    pub fn is_builtin_value(&self, name: &str) -> bool {
        matches!(name, "any" | "never" | "object" | "undefined" | "null")
            || self.table.values().any(|v| v == name)
    }
}
