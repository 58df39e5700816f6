use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::signature::{
    bare_name, normalize_signature, strip_namespaces, MAP_TYPES, POINTER_WRAPPERS, SCALAR_TYPES,
    SEQUENCE_TYPES,
};

/// Serialization key annotation (`json:"name,omitempty"` style).
pub const JSON_KEY: &str = "json";
/// Human readable field description.
pub const DESCRIPTION_KEY: &str = "description";
/// Storage hints: `type:varchar(255);default:none;size:8`.
pub const STORAGE_KEY: &str = "storage";
/// Presence of a validation rule marks the field as required.
pub const VALIDATE_KEY: &str = "validate";
/// Pipe-delimited list of allowed literal values.
pub const ENUM_KEY: &str = "enum";
/// Embedded/flattened field marker.
pub const INLINE_KEY: &str = "inline";

/// Serialization key value that drops a field from the output.
pub const SUPPRESSED_KEY: &str = "-";

/// Capability implemented by every type the generator can introspect.
///
/// Usually derived with `#[derive(Record)]`; hand-written implementations and
/// schema tables produce the same [`RecordType`]. The derive only supports
/// structs, so a field whose type is a Rust enum or a foreign struct is marked
/// `#[record(opaque)]`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Record`",
    note = "mark the field `#[record(opaque)]` when its type is an enum or a foreign type"
)]
pub trait Record {
    fn record_type() -> RecordType;
}

/// Constructor for a nested record handle, as captured by the derive macro.
pub type RecordFn = fn() -> RecordType;

/// Syntactic shape of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Primitive value (`bool`, integers, floats, strings)
    Scalar,
    /// Named composite type
    #[default]
    Struct,
    /// `Option`, `Box`, `Rc`, `Arc`, `Cow` or a reference
    Pointer,
    /// `Vec`, sets, arrays and slices
    Slice,
    /// `HashMap`, `BTreeMap` and friends
    Map,
    /// `serde_json::Value`, trait objects, tuples
    Dynamic,
}

impl FieldKind {
    /// Classify a textual signature the same way the derive macro classifies syntax.
    pub fn infer(signature: &str) -> Self {
        let normalized = strip_namespaces(&normalize_signature(signature));
        if normalized.starts_with('[') || normalized.starts_with("&[") {
            return FieldKind::Slice;
        }
        if normalized == "&str" {
            return FieldKind::Scalar;
        }
        if normalized.starts_with('&') {
            return FieldKind::Pointer;
        }
        if normalized.starts_with('(')
            || normalized.starts_with("dyn")
            || normalized.starts_with("impl")
        {
            return FieldKind::Dynamic;
        }
        let head = bare_name(&normalized);
        if SCALAR_TYPES.contains(&head) {
            FieldKind::Scalar
        } else if POINTER_WRAPPERS.contains(&head) {
            FieldKind::Pointer
        } else if SEQUENCE_TYPES.contains(&head) {
            FieldKind::Slice
        } else if MAP_TYPES.contains(&head) {
            FieldKind::Map
        } else if head.is_empty() || head == "Value" {
            FieldKind::Dynamic
        } else {
            FieldKind::Struct
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Struct => "struct",
            FieldKind::Pointer => "pointer",
            FieldKind::Slice => "slice",
            FieldKind::Map => "map",
            FieldKind::Dynamic => "dynamic",
        };
        write!(f, "{s}")
    }
}

/// Annotation bag attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<String, String>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Non-empty, trimmed value for `key`.
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.non_empty(DESCRIPTION_KEY)
    }

    /// A field is required when it carries a validation rule other than `-`.
    pub fn is_required(&self) -> bool {
        self.non_empty(VALIDATE_KEY)
            .map(|rule| rule != SUPPRESSED_KEY)
            .unwrap_or(false)
    }

    /// Raw enum constraint (`admin|view|edit|none`).
    pub fn enum_constraint(&self) -> Option<&str> {
        self.non_empty(ENUM_KEY)
    }

    /// `default:<value>` from the storage annotation.
    pub fn storage_default(&self) -> Option<String> {
        self.storage_entries()
            .find(|(k, _)| *k == "default")
            .map(|(_, v)| v.to_string())
    }

    /// `size:<n>` or `type:varchar(<n>)` from the storage annotation.
    pub fn max_length(&self) -> Option<String> {
        let mut length = None;
        for (key, value) in self.storage_entries() {
            match key {
                "size" if !value.is_empty() => length = Some(value.to_string()),
                "type" => {
                    if let Some(n) = value
                        .strip_prefix("varchar(")
                        .and_then(|rest| rest.strip_suffix(')'))
                        .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
                    {
                        length.get_or_insert_with(|| n.to_string());
                    }
                }
                _ => {}
            }
        }
        length
    }

    fn storage_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.get(STORAGE_KEY)
            .unwrap_or_default()
            .split(';')
            .filter_map(|entry| {
                let mut parts = entry.split(':');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(k), Some(v), None) => Some((k.trim(), v.trim())),
                    _ => None,
                }
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for Annotations {
    fn from(map: BTreeMap<String, String>) -> Self {
        Annotations(map)
    }
}

/// Metadata for one field of a record, in declaration order.
#[derive(Clone)]
pub struct FieldMeta {
    /// Declared Rust field name
    pub name: String,
    /// Type signature as written (`Option<Box<EmbedStruct>>`)
    pub signature: String,
    pub kind: FieldKind,
    pub annotations: Annotations,
    /// Handle for the record behind a struct or pointer field
    pub nested: Option<RecordFn>,
}

impl FieldMeta {
    /// Create a field whose kind is inferred from `signature`.
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        let signature = signature.into();
        FieldMeta {
            name: name.into(),
            kind: FieldKind::infer(&signature),
            signature,
            annotations: Annotations::new(),
            nested: None,
        }
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key, value);
        self
    }

    pub fn nested(mut self, handle: RecordFn) -> Self {
        self.nested = Some(handle);
        self
    }

    /// Key used in emitted output; `None` when the field is suppressed.
    ///
    /// `json:"-"` suppresses, `json:"name,omitempty"` keeps `name`, and an
    /// empty name (`json:",inline"` or no annotation) falls back to the
    /// declared name.
    pub fn serialization_key(&self) -> Option<String> {
        let tag = self.annotations.get(JSON_KEY).unwrap_or_default().trim();
        if tag == SUPPRESSED_KEY {
            return None;
        }
        let key = tag.split(',').next().unwrap_or_default().trim();
        if key.is_empty() || key == ".inline" {
            Some(self.name.clone())
        } else {
            Some(key.to_string())
        }
    }

    /// Embedded field (`json:",inline"`, `#[serde(flatten)]`, or `inline` annotation).
    pub fn is_inline(&self) -> bool {
        let tag_inline = self
            .annotations
            .get(JSON_KEY)
            .map(|tag| tag.split(',').skip(1).any(|opt| opt.trim() == "inline") || tag == ".inline")
            .unwrap_or(false);
        let flag = self
            .annotations
            .get(INLINE_KEY)
            .map(|v| v.trim() == "true")
            .unwrap_or(false);
        tag_inline || flag
    }

    /// Inline fields and `metadata`-keyed fields carry object metadata of foreign APIs.
    pub fn carries_object_metadata(&self) -> bool {
        self.is_inline()
            || self
                .annotations
                .get(JSON_KEY)
                .map(|tag| tag.split(',').next().unwrap_or_default().trim() == "metadata")
                .unwrap_or(false)
    }
}

impl fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("kind", &self.kind)
            .field("annotations", &self.annotations)
            .field("nested", &self.nested.is_some())
            .finish()
    }
}

/// Enumerated metadata of a record type: the resolved form of a type handle.
#[derive(Debug, Clone)]
pub struct RecordType {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldMeta>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        RecordType {
            name: name.into(),
            doc: None,
            fields: Vec::new(),
        }
    }

    /// Handle for a type implementing [`Record`].
    pub fn of<T: Record>() -> Self {
        T::record_type()
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        let doc = doc.into();
        self.doc = if doc.trim().is_empty() { None } else { Some(doc) };
        self
    }

    pub fn field(mut self, field: FieldMeta) -> Self {
        self.fields.push(field);
        self
    }

    /// `{"<json key>":"<description>"}` summary used for non-success responses.
    ///
    /// Keys use the name part of the `json` annotation (declared name when
    /// absent) and descriptions fall back to the declared name.
    pub fn field_summary(&self) -> String {
        let summary: BTreeMap<&str, &str> = self
            .fields
            .iter()
            .map(|field| {
                let key = field
                    .annotations
                    .get(JSON_KEY)
                    .and_then(|tag| tag.split(',').next())
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .unwrap_or(&field.name);
                let description = field.annotations.description().unwrap_or(&field.name);
                (key, description)
            })
            .collect();
        serde_json::to_string(&summary).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_kind() {
        assert_eq!(FieldKind::infer("u32"), FieldKind::Scalar);
        assert_eq!(FieldKind::infer("&'a str"), FieldKind::Scalar);
        assert_eq!(FieldKind::infer("Option<u32>"), FieldKind::Pointer);
        assert_eq!(FieldKind::infer("Vec<Account>"), FieldKind::Slice);
        assert_eq!(FieldKind::infer("[u8; 4]"), FieldKind::Slice);
        assert_eq!(FieldKind::infer("std::collections::HashMap<String, u32>"), FieldKind::Map);
        assert_eq!(FieldKind::infer("serde_json::Value"), FieldKind::Dynamic);
        assert_eq!(FieldKind::infer("models::Account"), FieldKind::Struct);
    }

    #[test]
    fn test_serialization_key_fallbacks() {
        let plain = FieldMeta::new("nick_name", "String");
        assert_eq!(plain.serialization_key().as_deref(), Some("nick_name"));

        let renamed =
            FieldMeta::new("nick_name", "String").annotate(JSON_KEY, "nickname,omitempty");
        assert_eq!(renamed.serialization_key().as_deref(), Some("nickname"));

        let suppressed = FieldMeta::new("password", "String").annotate(JSON_KEY, "-");
        assert_eq!(suppressed.serialization_key(), None);

        let inline = FieldMeta::new("meta", "ObjectMeta").annotate(JSON_KEY, ",inline");
        assert_eq!(inline.serialization_key().as_deref(), Some("meta"));
        assert!(inline.is_inline());
        assert!(inline.carries_object_metadata());
    }

    #[test]
    fn test_storage_annotations() {
        let mut ann = Annotations::new();
        ann.insert(STORAGE_KEY, "type:varchar(50);default:none");
        assert_eq!(ann.storage_default().as_deref(), Some("none"));
        assert_eq!(ann.max_length().as_deref(), Some("50"));

        let mut sized = Annotations::new();
        sized.insert(STORAGE_KEY, "type:uint;size:8;default:1");
        assert_eq!(sized.max_length().as_deref(), Some("8"));
        assert_eq!(sized.storage_default().as_deref(), Some("1"));

        assert_eq!(Annotations::new().max_length(), None);
    }

    #[test]
    fn test_required_flag() {
        let mut ann = Annotations::new();
        assert!(!ann.is_required());
        ann.insert(VALIDATE_KEY, "-");
        assert!(!ann.is_required());
        ann.insert(VALIDATE_KEY, "required,max=255");
        assert!(ann.is_required());
    }

    #[test]
    fn test_field_summary() {
        let record = RecordType::new("ErrorBody")
            .field(
                FieldMeta::new("code", "u32")
                    .annotate(JSON_KEY, "code")
                    .annotate(DESCRIPTION_KEY, "error code"),
            )
            .field(FieldMeta::new("message", "String"));
        assert_eq!(
            record.field_summary(),
            r#"{"code":"error code","message":"message"}"#
        );
    }
}
