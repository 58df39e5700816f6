use askama::Template;

use super::resolver::{ResolvedSchema, ANY};
use super::schema::{BuiltinTypes, EnumLiteral, FieldDescriptor, RecordDescriptor};
use super::templates::{ConstantView, RecordView, TypesTemplateData};
use crate::config::GeneratorConfig;

/// Render the type declaration artifact: enum aliases, record types, then
/// `any` aliases for every referenced name without a declaration.
///
/// Returns an empty string when there is nothing to declare.
pub fn render_declarations(
    schema: &ResolvedSchema,
    builtins: &BuiltinTypes,
    config: &GeneratorConfig,
) -> anyhow::Result<String> {
    let constants: Vec<ConstantView> = schema
        .enums
        .values()
        .map(|constant| ConstantView {
            name: constant.name.clone(),
            description: constant.description.clone(),
            literals: constant.union(),
        })
        .collect();

    let records: Vec<RecordView> = schema
        .records
        .values()
        .filter(|record| !config.is_internal_marker(&record.name))
        .map(record_view)
        .collect();

    let leftovers: Vec<String> = schema.leftovers(builtins, config).into_iter().collect();

    let template = TypesTemplateData {
        constants,
        records,
        leftovers,
    };
    let rendered = template.render()?;
    let trimmed = rendered.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("{trimmed}\n"))
}

fn record_view(record: &RecordDescriptor) -> RecordView {
    let header = match record.doc.as_deref().map(str::trim) {
        Some(doc) if !doc.is_empty() => format!("{} {}", record.name, doc),
        _ => record.name.clone(),
    };
    RecordView {
        name: record.name.clone(),
        header,
        lines: record.fields.iter().flat_map(field_lines).collect(),
    }
}

fn field_lines(field: &FieldDescriptor) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(description) = &field.description {
        lines.push(format!("// {description}"));
    }
    if let Some(default) = &field.default {
        lines.push(format!("// default: {default}"));
    }
    if !field.enum_values.is_empty() {
        let values: Vec<String> = field.enum_values.iter().map(EnumLiteral::raw).collect();
        lines.push(format!("// values: {}", values.join(";")));
    }
    if let Some(max_length) = &field.max_length {
        lines.push(format!("// max length: {max_length}"));
    }
    let ty = if field.ty.trim().is_empty() {
        ANY
    } else {
        field.ty.as_str()
    };
    let optional = if field.required { "" } else { "?" };
    lines.push(format!("{}{optional}: {ty};", property_key(&field.key)));
    lines
}

/// Keys that are not identifiers (`dark-mode`) are single-quoted.
fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        key.to_string()
    } else {
        format!("'{}'", key.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}
