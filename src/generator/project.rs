use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::declarations::render_declarations;
use super::resolver::{ResolvedSchema, TypeResolver};
use super::routes::{describe_route, render_apis, ApiDescriptor};
use super::schema::BuiltinTypes;
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostic;
use crate::metadata::{Record, RecordType, Route};

/// Which artifacts a run writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationScope {
    /// `<date>.types.d.ts`
    pub types: bool,
    /// `<date>.<group>.api.ts`
    pub apis: bool,
}

impl GenerationScope {
    pub fn all() -> Self {
        GenerationScope {
            types: true,
            apis: true,
        }
    }
}

impl Default for GenerationScope {
    fn default() -> Self {
        Self::all()
    }
}

/// Rendered artifacts of one run
#[derive(Debug, Clone, Default)]
pub struct GeneratedOutput {
    /// Type declaration text; empty when nothing was declared
    pub declarations: String,
    /// Group name → client module text
    pub apis: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Files written (or, on a dry run, that would be written)
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Collects record types and routes, then renders both artifact kinds.
///
/// ```rust
/// use http::Method;
/// use schemagen::{FieldMeta, Generator, GeneratorConfig, RecordType, Route};
///
/// let mut generator = Generator::new(GeneratorConfig::default());
/// generator.register_type(RecordType::new("Ping").field(FieldMeta::new("at", "u64")));
/// generator.register_route(Route::new(Method::GET, "/ping").operation("ping"));
/// let output = generator.generate().unwrap();
/// assert!(output.declarations.contains("type Ping = {"));
/// assert!(output.apis["api"].contains("export const getPing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
    types: Vec<RecordType>,
    definitions: Vec<RecordType>,
    routes: Vec<Route>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator {
            config,
            types: Vec::new(),
            definitions: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Register a record for emission. The first registration of a name wins.
    pub fn register_type(&mut self, record: RecordType) -> &mut Self {
        if self.types.iter().any(|t| t.name == record.name) {
            debug!(record = %record.name, "record already registered");
        } else {
            self.types.push(record);
        }
        self
    }

    pub fn register<T: Record>(&mut self) -> &mut Self {
        self.register_type(RecordType::of::<T>())
    }

    /// Make a record known for lookups; it is emitted only when referenced.
    pub fn define_type(&mut self, record: RecordType) -> &mut Self {
        if !self.definitions.iter().any(|t| t.name == record.name) {
            self.definitions.push(record);
        }
        self
    }

    /// Append a route; duplicates by method and path are merged at render time.
    pub fn register_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    fn builtins(&self) -> BuiltinTypes {
        BuiltinTypes::with_overrides(&self.config.builtin_types)
    }

    /// Run the resolver over every registered record and route payload.
    pub fn resolve(&self) -> (ResolvedSchema, Vec<ApiDescriptor>) {
        let builtins = self.builtins();
        let mut resolver = TypeResolver::new(&self.config, &builtins);
        for record in self.types.iter().chain(self.definitions.iter()) {
            resolver.define(record.clone());
        }
        for record in &self.types {
            resolver.resolve(record);
        }
        let apis = self
            .routes
            .iter()
            .map(|route| describe_route(route, &self.config, &mut resolver))
            .collect();
        (resolver.finish(), apis)
    }

    /// Render declarations and client modules in memory.
    pub fn generate(&self) -> anyhow::Result<GeneratedOutput> {
        let template = self.config.route_template_source()?;
        let (schema, apis) = self.resolve();
        let declarations = render_declarations(&schema, &self.builtins(), &self.config)?;
        let (groups, render_diagnostics) = render_apis(&apis, &self.config, &template)?;

        let mut diagnostics = schema.diagnostics;
        diagnostics.extend(render_diagnostics);
        Ok(GeneratedOutput {
            declarations,
            apis: groups,
            diagnostics,
        })
    }

    /// Write every artifact into `dir`.
    pub fn generate_to_dir(&self, dir: &Path) -> anyhow::Result<GenerationReport> {
        self.generate_with_options(dir, &GenerationScope::all(), false)
    }

    /// Write the artifacts selected by `scope`; with `dry_run` nothing touches disk.
    ///
    /// Files are named `<YYYY-MM-DD>.types.d.ts` and
    /// `<YYYY-MM-DD>.<group>.api.ts` (without the date when `date_prefix` is
    /// off) and overwrite earlier output. Empty artifacts are skipped.
    pub fn generate_with_options(
        &self,
        dir: &Path,
        scope: &GenerationScope,
        dry_run: bool,
    ) -> anyhow::Result<GenerationReport> {
        let output = self.generate()?;
        let prefix = if self.config.date_prefix {
            format!("{}.", chrono::Local::now().format("%Y-%m-%d"))
        } else {
            String::new()
        };

        let mut artifacts: Vec<(PathBuf, &str)> = Vec::new();
        if scope.types && !output.declarations.is_empty() {
            artifacts.push((dir.join(format!("{prefix}types.d.ts")), output.declarations.as_str()));
        }
        if scope.apis {
            for (group, text) in &output.apis {
                if !text.is_empty() {
                    artifacts.push((dir.join(format!("{prefix}{group}.api.ts")), text.as_str()));
                }
            }
        }

        if !dry_run && !artifacts.is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }
        let mut written = Vec::new();
        for (path, text) in artifacts {
            if dry_run {
                info!(path = %path.display(), bytes = text.len(), "dry run, not writing");
            } else {
                fs::write(&path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), bytes = text.len(), "wrote artifact");
            }
            written.push(path);
        }

        Ok(GenerationReport {
            written,
            diagnostics: output.diagnostics,
        })
    }
}
