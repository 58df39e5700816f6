use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use super::types::{Record, RecordType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Header,
    Form,
    #[serde(rename = "multipart/form-data", alias = "multipart")]
    Multipart,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Body => write!(f, "body"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Form => write!(f, "form"),
            ParameterLocation::Multipart => write!(f, "multipart/form-data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum DataType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number", alias = "integer")]
    Number,
    #[serde(rename = "boolean", alias = "bool")]
    Boolean,
    #[serde(rename = "string[]")]
    StringList,
    #[serde(rename = "number[]")]
    NumberList,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::StringList => "string[]",
            DataType::NumberList => "number[]",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub data_type: DataType,
    pub location: ParameterLocation,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default, alias = "enum")]
    pub allowed_values: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: DataType, location: ParameterLocation) -> Self {
        Parameter {
            name: name.into(),
            data_type,
            location,
            description: String::new(),
            required: false,
            default: None,
            allowed_values: Vec::new(),
        }
    }

    /// Path parameters are always required.
    pub fn path(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, ParameterLocation::Path).required(true)
    }

    pub fn query(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, ParameterLocation::Query)
    }

    pub fn body(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, ParameterLocation::Body)
    }

    pub fn header(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, ParameterLocation::Header)
    }

    pub fn form(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, ParameterLocation::Form)
    }

    pub fn multipart(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, ParameterLocation::Multipart)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// A documented response of a route.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub code: u16,
    pub message: String,
    pub model: Option<RecordType>,
}

impl ResponseSpec {
    /// 200 and 201 responses carry the payload type.
    pub fn is_success(&self) -> bool {
        matches!(self.code, 200 | 201)
    }
}

/// One exposed endpoint, as registered by the host HTTP framework.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub operation: String,
    pub doc: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub parameters: Vec<Parameter>,
    /// Request payload type
    pub reads: Option<RecordType>,
    /// Response payload type
    pub writes: Option<RecordType>,
    pub responses: Vec<ResponseSpec>,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Route {
            method,
            path: path.into(),
            operation: String::new(),
            doc: String::new(),
            notes: String::new(),
            tags: Vec::new(),
            metadata: BTreeMap::new(),
            parameters: Vec::new(),
            reads: None,
            writes: None,
            responses: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn reads<T: Record>(self) -> Self {
        self.reads_type(RecordType::of::<T>())
    }

    pub fn reads_type(mut self, record: RecordType) -> Self {
        self.reads = Some(record);
        self
    }

    pub fn writes<T: Record>(self) -> Self {
        self.writes_type(RecordType::of::<T>())
    }

    pub fn writes_type(mut self, record: RecordType) -> Self {
        self.writes = Some(record);
        self
    }

    pub fn returns(
        mut self,
        code: u16,
        message: impl Into<String>,
        model: Option<RecordType>,
    ) -> Self {
        self.responses.push(ResponseSpec {
            code,
            message: message.into(),
            model,
        });
        self
    }

    pub fn returns_model<T: Record>(self, code: u16, message: impl Into<String>) -> Self {
        self.returns(code, message, Some(RecordType::of::<T>()))
    }

    /// Composite identity used when merging duplicate registrations.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}
