//! Route normalization and client stub rendering.

use anyhow::Context;
use http::Method;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use super::resolver::TypeResolver;
use super::schema::upper_first;
use super::templates::ROUTE_TEMPLATE_NAME;
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Severity};
use crate::metadata::{Parameter, ParameterLocation, Route};

#[allow(clippy::expect_used)]
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid placeholder regex"));

/// A route normalized for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiDescriptor {
    pub function_name: String,
    pub method: Method,
    pub path: String,
    /// Output group (file) the stub belongs to
    pub group: String,
    pub doc: String,
    pub notes: String,
    /// Merged by name, last declaration wins, first position kept
    pub parameters: Vec<Parameter>,
    /// Status code → type name or inline field summary
    pub responses: BTreeMap<u16, String>,
}

impl ApiDescriptor {
    /// `METHOD path`, the merge identity of a route
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Path parameter names: placeholders in path order, then declared path
    /// parameters the template does not mention.
    pub fn path_params(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for capture in PLACEHOLDER_RE.captures_iter(&self.path) {
            let name = placeholder_name(&capture[1]);
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        for param in &self.parameters {
            if param.location == ParameterLocation::Path && !names.contains(&param.name) {
                names.push(param.name.clone());
            }
        }
        names
    }

    /// Path template as the body of a JS template literal (`/a/{id}` → `/a/${id}`).
    pub fn url(&self) -> String {
        PLACEHOLDER_RE
            .replace_all(&self.path, |caps: &regex::Captures<'_>| {
                format!("${{{}}}", placeholder_name(&caps[1]))
            })
            .into_owned()
    }

    /// Documentation block, one `// ...` line each.
    pub fn doc_block(&self) -> String {
        let mut lines = vec![format!("// {}", self.doc)];
        if !self.notes.trim().is_empty() {
            lines.push(format!("// {}", self.notes));
        }
        for (code, data) in &self.responses {
            lines.push(format!("// response {code}: {data}"));
        }
        for param in &self.parameters {
            let mut line = format!(
                "// param {} type: {} in: {} required: {} description: {}",
                param.name,
                param.data_type,
                param.location,
                if param.required { "yes" } else { "no" },
                param.description
            );
            if let Some(default) = param.default.as_deref().filter(|d| !d.is_empty()) {
                line.push_str(&format!(" default: {default}"));
            }
            if !param.allowed_values.is_empty() {
                line.push_str(&format!(" values: {}", param.allowed_values.join(";")));
            }
            lines.push(line.trim_end().to_string());
        }
        let mut block = lines.join("\n");
        block.push('\n');
        block
    }
}

/// `{id:[0-9]+}` → `id`
fn placeholder_name(raw: &str) -> &str {
    raw.split(':').next().unwrap_or_default().trim()
}

fn function_name(route: &Route, config: &GeneratorConfig) -> String {
    if let Some(explicit) = route
        .metadata
        .get(&config.function_name_key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        return explicit.to_string();
    }
    let operation = if route.operation.trim().is_empty() {
        route
            .path
            .split('/')
            .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
            .map(|segment| {
                segment
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .map(upper_first)
                    .collect::<String>()
            })
            .collect::<String>()
    } else {
        upper_first(route.operation.trim())
    };
    format!("{}{}", route.method.as_str().to_lowercase(), operation)
}

fn group_name(route: &Route, config: &GeneratorConfig) -> String {
    route
        .tags
        .iter()
        .map(|tag| tag.trim())
        .find(|tag| !tag.is_empty())
        .map(|tag| {
            tag.chars()
                .map(|c| if c.is_alphanumeric() { c } else { '_' })
                .collect()
        })
        .unwrap_or_else(|| config.default_group.clone())
}

/// Normalize a route and register its payload types with the resolver.
pub fn describe_route(
    route: &Route,
    config: &GeneratorConfig,
    resolver: &mut TypeResolver<'_>,
) -> ApiDescriptor {
    if let Some(reads) = &route.reads {
        resolver.resolve(reads);
    }
    if let Some(writes) = &route.writes {
        resolver.resolve(writes);
    }

    let mut responses = BTreeMap::new();
    for response in &route.responses {
        let data = match &response.model {
            Some(model) if response.is_success() => resolver.resolve(model),
            Some(model) => model.field_summary(),
            None if !response.message.trim().is_empty() => response.message.clone(),
            None => continue,
        };
        responses.insert(response.code, data);
    }

    let mut parameters: Vec<Parameter> = Vec::new();
    for param in &route.parameters {
        match parameters.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => *existing = param.clone(),
            None => parameters.push(param.clone()),
        }
    }

    ApiDescriptor {
        function_name: function_name(route, config),
        method: route.method.clone(),
        path: route.path.clone(),
        group: group_name(route, config),
        doc: route.doc.clone(),
        notes: route.notes.clone(),
        parameters,
        responses,
    }
}

#[derive(Serialize)]
struct StubContext {
    description: String,
    function_name: String,
    method: String,
    url: String,
    path_params: Vec<String>,
    query: bool,
    body: bool,
}

impl From<&ApiDescriptor> for StubContext {
    fn from(api: &ApiDescriptor) -> Self {
        let body = [Method::POST, Method::PUT, Method::PATCH].contains(&api.method);
        let query = [Method::GET, Method::DELETE, Method::HEAD].contains(&api.method);
        StubContext {
            description: api.doc_block(),
            function_name: api.function_name.clone(),
            method: api.method.as_str().to_lowercase(),
            url: api.url(),
            path_params: api.path_params(),
            query,
            body,
        }
    }
}

/// Render every route into per-group client modules.
///
/// Routes are merged by `METHOD path` (last wins) and rendered in key order.
/// A route that fails to render is left out and reported as a diagnostic.
///
/// # Errors
///
/// Returns an error if `template_source` is not a valid template.
pub fn render_apis(
    apis: &[ApiDescriptor],
    config: &GeneratorConfig,
    template_source: &str,
) -> anyhow::Result<(BTreeMap<String, String>, Vec<Diagnostic>)> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(ROUTE_TEMPLATE_NAME, template_source)
        .context("invalid route stub template")?;
    let template = env.get_template(ROUTE_TEMPLATE_NAME)?;

    let merged: BTreeMap<String, &ApiDescriptor> =
        apis.iter().map(|api| (api.key(), api)).collect();

    let mut groups: BTreeMap<String, String> = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for (key, api) in merged {
        match template.render(StubContext::from(api)) {
            Ok(stub) => {
                let buffer = groups.entry(api.group.clone()).or_insert_with(|| {
                    format!("import {{ request }} from '{}';\n", config.request_import)
                });
                buffer.push('\n');
                buffer.push_str(stub.trim_end());
                buffer.push('\n');
            }
            Err(err) => {
                warn!(route = %key, error = %err, "failed to render route stub");
                diagnostics.push(
                    Diagnostic::new(
                        format!("route:{key}"),
                        Severity::Error,
                        "route_render",
                        err.to_string(),
                    )
                    .with_suggestion("check the variables used by the route template"),
                );
            }
        }
    }
    Ok((groups, diagnostics))
}
