//! # Metadata Module
//!
//! Read-only view of the host program handed to the generator: record type
//! handles ([`RecordType`], usually produced by `#[derive(Record)]`) and route
//! descriptors ([`Route`]).
//!
//! ## Record handles
//!
//! ```rust
//! use schemagen::{FieldMeta, RecordType};
//!
//! let account = RecordType::new("Account")
//!     .with_doc("System account")
//!     .field(FieldMeta::new("id", "u32").annotate("json", "id").annotate("validate", "required"))
//!     .field(FieldMeta::new("role", "String").annotate("enum", "admin|view|edit|none"));
//! assert_eq!(account.fields.len(), 2);
//! ```
//!
//! ## Routes
//!
//! ```rust
//! use http::Method;
//! use schemagen::{DataType, Parameter, Route};
//!
//! let route = Route::new(Method::GET, "/accounts/{id}")
//!     .operation("account")
//!     .tag("account-api")
//!     .param(Parameter::path("id", DataType::Number))
//!     .param(Parameter::query("size", DataType::Number));
//! assert_eq!(route.key(), "GET /accounts/{id}");
//! ```

mod route;
mod signature;
mod table;
mod types;

pub use route::{DataType, Parameter, ParameterLocation, ResponseSpec, Route};
pub use signature::{
    bare_name, normalize_signature, reduce_signature, strip_indirection, strip_namespaces,
    INTEGER_TYPES,
};
pub use table::{FieldEntry, RecordEntry, ResponseEntry, RouteEntry, SchemaTable};
pub use types::{
    Annotations, FieldKind, FieldMeta, Record, RecordFn, RecordType, DESCRIPTION_KEY, ENUM_KEY,
    INLINE_KEY, JSON_KEY, STORAGE_KEY, SUPPRESSED_KEY, VALIDATE_KEY,
};
