//! # CLI Module
//!
//! Command-line front end for the generator, driven by a schema table.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! ```bash
//! schemagen generate --schema schema.yaml --output web/src/api
//! ```
//!
//! Options:
//! - `--schema <FILE>` - Schema table (YAML or JSON, required)
//! - `--output <DIR>` - Output directory (required, created if missing)
//! - `--config <FILE>` - Generator configuration (YAML, JSON or TOML)
//! - `--only <PARTS>` - `types`, `apis` or both (default: both)
//! - `--dry-run` - List the files that would be written
//! - `--fail-on-error` - Exit non-zero on error-level diagnostics
//!
//! ### `inspect`
//!
//! Print what the resolver sees without writing anything:
//!
//! ```bash
//! schemagen inspect --schema schema.yaml
//! ```

mod commands;


pub use commands::{run, Cli, Commands, OnlyPart};
