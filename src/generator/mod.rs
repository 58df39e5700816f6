//! # Generator Module
//!
//! Turns record and route metadata into TypeScript artifacts:
//! - **Type declarations** - one `type` per record, union aliases for enum
//!   fields and `any` aliases for names without a declaration
//! - **Client stubs** - one async function per route, grouped into one module
//!   per route group
//!
//! ## Architecture
//!
//! ```text
//! Record / Route metadata → TypeResolver → ResolvedSchema ─┬→ declarations (askama)
//!                                                          └→ route stubs (minijinja)
//! ```
//!
//! 1. **Collect** - [`Generator`] holds registered records, catalog-only
//!    definitions and routes
//! 2. **Resolve** - [`TypeResolver`] maps every field to a TypeScript type,
//!    registering nested records on first reference and terminating on cycles
//! 3. **Render** - declarations use the bundled askama template; stubs use a
//!    minijinja template that configuration can replace
//! 4. **Write** - [`Generator::generate_to_dir`] writes
//!    `<YYYY-MM-DD>.types.d.ts` and `<YYYY-MM-DD>.<group>.api.ts`
//!
//! ## Usage
//!
//! ### CLI Usage
//!
//! ```bash
//! schemagen generate --schema schema.yaml --output web/src/api
//! ```
//!
//! ### Programmatic Usage
//!
//! ```rust,ignore
//! use schemagen::{Generator, GeneratorConfig, Record};
//!
//! #[derive(Record)]
//! struct Account {
//!     #[record(json = "id", validate = "required")]
//!     id: u32,
//! }
//!
//! let mut generator = Generator::new(GeneratorConfig::default());
//! generator.register::<Account>();
//! generator.generate_to_dir("web/src/api".as_ref())?;
//! ```
//!
//! ## Determinism
//!
//! Enum aliases, records, leftover aliases, groups and routes inside a group
//! are all emitted in name order, so repeated runs over the same metadata
//! produce identical files.

mod declarations;
mod project;
mod resolver;
mod routes;
mod schema;
mod templates;

#[cfg(test)]
mod tests;

pub use declarations::render_declarations;
pub use project::{GeneratedOutput, GenerationReport, GenerationScope, Generator};
pub use resolver::{ResolvedSchema, TypeResolver, ANY};
pub use routes::{describe_route, render_apis, ApiDescriptor};
pub use schema::{
    to_camel_case, upper_first, BuiltinTypes, EnumConstant, EnumKind, EnumLiteral,
    FieldDescriptor, RecordDescriptor,
};
pub use templates::{DEFAULT_ROUTE_TEMPLATE, ROUTE_TEMPLATE_NAME};
