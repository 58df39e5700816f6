//! # schemagen
//!
//! **schemagen** turns the record types and route metadata of a Rust service into
//! TypeScript artifacts for its web front end:
//!
//! - `<YYYY-MM-DD>.types.d.ts` - one `type` declaration per record, union aliases
//!   for enum-constrained fields and `any` aliases for foreign names
//! - `<YYYY-MM-DD>.<group>.api.ts` - one async client stub per route, grouped by
//!   the route's first tag
//!
//! ## Architecture
//!
//! - **[`metadata`]** - record handles ([`Record`], [`RecordType`]), route
//!   descriptors ([`Route`]) and the serialized schema table
//! - **[`generator`]** - type resolution and the two emitters
//! - **[`config`]** - [`GeneratorConfig`], loaded from YAML, JSON or TOML
//! - **[`diagnostics`]** - non-fatal problems reported by a run
//! - **[`logging`]** - `tracing` subscriber setup for the binary
//! - **[`cli`]** - the `schemagen` command line
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host program
//!     participant Gen as Generator
//!     participant Res as TypeResolver
//!     participant Decl as declarations (askama)
//!     participant Stub as routes (minijinja)
//!     participant FS as File System
//!
//!     Host->>Gen: register::<Account>() / register_route(route)
//!     Host->>Gen: generate_to_dir("web/src/api")
//!     Gen->>Res: resolve(records), describe_route(routes)
//!     Res->>Res: builtin lookup, strip wrappers,<br/>recurse into nested records
//!     Res-->>Gen: ResolvedSchema + ApiDescriptors
//!     Gen->>Decl: render_declarations(schema)
//!     Gen->>Stub: render_apis(apis)
//!     Stub-->>Gen: group → module text, diagnostics
//!     Gen->>FS: write dated files
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use schemagen::{DataType, Generator, GeneratorConfig, Parameter, Record, Route};
//!
//! /// System account
//! #[derive(Record)]
//! struct Account {
//!     #[record(json = "id", validate = "required")]
//!     id: u32,
//!     /// account role
//!     #[record(json = "role", validate = "required", enum = "admin|view|edit|none")]
//!     role: String,
//!     #[record(json = "nickname,omitempty", storage = "default:\"\"")]
//!     nickname: String,
//! }
//!
//! let mut generator = Generator::new(GeneratorConfig::default());
//! generator.register::<Account>();
//! generator.register_route(
//!     Route::new(Method::GET, "/accounts/{id}")
//!         .operation("account")
//!         .tag("account")
//!         .param(Parameter::path("id", DataType::Number))
//!         .returns_model::<Account>(200, "OK"),
//! );
//!
//! let output = generator.generate().unwrap();
//! assert!(output.declarations.contains("type AccountRole = 'admin'|'view'|'edit'|'none';"));
//! assert!(output.apis["account"].contains("const { id, ...rest } = params ?? {};"));
//! ```
//!
//! ## Logging
//!
//! The library only emits `tracing` events (`debug` per resolved record, `info`
//! per written file, `warn` per dropped route). The binary installs a
//! subscriber through [`logging::init_logging`].

extern crate self as schemagen;

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod logging;
pub mod metadata;

pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, Severity};
pub use generator::{GeneratedOutput, GenerationReport, GenerationScope, Generator};
pub use metadata::{
    Annotations, DataType, FieldKind, FieldMeta, Parameter, ParameterLocation, Record,
    RecordType, ResponseSpec, Route, SchemaTable,
};

/// `#[derive(Record)]`: implements [`Record`] from struct fields and attributes.
pub use schemagen_macros::Record;
