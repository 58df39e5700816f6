use askama::Template;

/// Bundled minijinja template for one route stub.
///
/// Context: `description` (doc block, one `// ...\n` line each),
/// `function_name`, `method` (lower-case), `url` (template-literal body),
/// `path_params` (names to destructure), `query` and `body` (how the
/// remaining parameters are passed).
pub const DEFAULT_ROUTE_TEMPLATE: &str = include_str!("../../templates/route_stub.ts.j2");

/// Name the route template is registered under
pub const ROUTE_TEMPLATE_NAME: &str = "route_stub.ts";

/// Enum alias line data
#[derive(Debug, Clone)]
pub struct ConstantView {
    pub name: String,
    pub description: String,
    /// `'a'|'b'` or `1|0`
    pub literals: String,
}

/// Record block data
#[derive(Debug, Clone)]
pub struct RecordView {
    pub name: String,
    /// `<Name> <doc>`
    pub header: String,
    /// Comment and member lines, unindented
    pub lines: Vec<String>,
}

/// Template data for generating `<date>.types.d.ts`
#[derive(Template)]
#[template(path = "types.d.ts.txt", escape = "none")]
pub struct TypesTemplateData {
    pub constants: Vec<ConstantView>,
    pub records: Vec<RecordView>,
    /// Referenced names without a declaration, aliased to `any`
    pub leftovers: Vec<String>,
}
