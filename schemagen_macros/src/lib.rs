//! `#[derive(Record)]` for schemagen.
//!
//! Field metadata comes from `#[record(...)]`, with fallbacks to the usual
//! serde attributes and doc comments:
//!
//! | attribute | annotation |
//! |-----------|------------|
//! | `#[record(json = "id,omitempty")]` / `#[serde(rename = "id")]` | `json` |
//! | `#[serde(skip)]` | `json = "-"` |
//! | `#[record(inline)]` / `#[serde(flatten)]` | `inline = "true"` |
//! | `#[record(description = "...")]` / `/// doc` | `description` |
//! | `#[record(storage = "...")]`, `validate`, `enum` | same key |
//! | `#[record(opaque)]` | no nested record handle |
//! | `#[record(skip)]` | field left out entirely |
//!
//! A container-level `#[serde(rename_all = "...")]` renames every field that
//! has neither `record(json)` nor `serde(rename)`.
//!
//! Struct and pointer fields of a named type get a nested handle, which makes
//! the derive require `FieldType: Record`. Fields whose type cannot implement
//! it (plain Rust enums, foreign structs) need `#[record(opaque)]`; an enum
//! field usually also wants `#[record(enum = "a|b")]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::meta::ParseNestedMeta;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, ExprLit, Fields, GenericArgument,
    Lit, LitStr, Meta, PathArguments, Token, Type,
};

const SCALARS: &[&str] = &[
    "bool", "char", "str", "String", "f32", "f64", "u8", "u16", "u32", "u64", "u128", "usize",
    "i8", "i16", "i32", "i64", "i128", "isize",
];
const POINTERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow", "RefCell", "Cell"];
const SEQUENCES: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList", "SmallVec"];
const MAPS: &[&str] = &["HashMap", "BTreeMap", "IndexMap", "Map"];

/// Well-known types that never implement `Record`.
const FOREIGN: &[&str] = &[
    "Value",
    "DateTime",
    "NaiveDateTime",
    "NaiveDate",
    "NaiveTime",
    "SystemTime",
    "Instant",
    "Duration",
    "OffsetDateTime",
    "PrimitiveDateTime",
    "Uuid",
    "Ulid",
    "Decimal",
    "Url",
    "PathBuf",
    "PhantomData",
    "Utc",
    "Local",
    "JsonMap",
    "ArrayString",
    "ArrayUint",
    "TypeMeta",
    "ObjectMeta",
    "TokenReviewSpec",
    "TokenReviewStatus",
];

#[derive(Default)]
struct FieldAttrs {
    json: Option<String>,
    description: Option<String>,
    storage: Option<String>,
    validate: Option<String>,
    enum_values: Option<String>,
    inline: bool,
    opaque: bool,
    skip: bool,
    serde_rename: Option<String>,
    serde_skip: bool,
    serde_flatten: bool,
}

#[derive(Default)]
struct ContainerAttrs {
    name: Option<String>,
    description: Option<String>,
    rename_all: Option<RenameRule>,
}

/// serde's `rename_all` rules, as applied to field names.
#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return Err(syn::Error::new_spanned(lit, "unknown rename_all rule")),
        })
    }

    /// Field names are snake_case already, so `lowercase` and `snake_case` keep them.
    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for c in field.chars() {
                    if c == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(c.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(c);
                    }
                }
                pascal
            }
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let name = container
        .name
        .unwrap_or_else(|| input.ident.to_string());
    let doc = container.description.or_else(|| doc_comment(&input.attrs));
    let generic_params: Vec<String> = input
        .generics
        .type_params()
        .map(|p| p.ident.to_string())
        .collect();

    let mut field_exprs = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let signature = signature_of(&field.ty);
        let kind = syn::Ident::new(classify(&field.ty), proc_macro2::Span::call_site());

        let mut annotations: Vec<(&str, String)> = Vec::new();
        let json = attrs.json.clone().or_else(|| {
            if attrs.serde_skip {
                Some("-".to_string())
            } else {
                attrs
                    .serde_rename
                    .clone()
                    .or_else(|| container.rename_all.map(|rule| rule.apply(field_name)))
            }
        });
        if let Some(json) = json {
            annotations.push(("json", json));
        }
        if let Some(description) = attrs.description.clone().or_else(|| doc_comment(&field.attrs)) {
            annotations.push(("description", description));
        }
        if let Some(storage) = attrs.storage.clone() {
            annotations.push(("storage", storage));
        }
        if let Some(validate) = attrs.validate.clone() {
            annotations.push(("validate", validate));
        }
        if let Some(values) = attrs.enum_values.clone() {
            annotations.push(("enum", values));
        }
        if attrs.inline || attrs.serde_flatten {
            annotations.push(("inline", "true".to_string()));
        }

        let mut expr = quote! {
            ::schemagen::FieldMeta::new(#field_name, #signature)
                .kind(::schemagen::FieldKind::#kind)
        };
        for (key, value) in annotations {
            expr = quote! { #expr.annotate(#key, #value) };
        }
        if !attrs.opaque {
            if let Some(nested) = record_candidate(&field.ty, &generic_params) {
                expr = quote! { #expr.nested(<#nested as ::schemagen::Record>::record_type) };
            }
        }
        field_exprs.push(expr);
    }

    let with_doc = doc.map(|doc| quote! { .with_doc(#doc) });
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::schemagen::Record for #ident #ty_generics #where_clause {
            fn record_type() -> ::schemagen::RecordType {
                ::schemagen::RecordType::new(#name)
                    #with_doc
                    #( .field(#field_exprs) )*
            }
        }
    })
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

/// Path of a nested meta as text; keywords like `enum` are accepted.
fn meta_key(meta: &ParseNestedMeta) -> String {
    meta.path
        .get_ident()
        .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default()
}

/// Consume a meta item nobody here cares about.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut container = ContainerAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                match meta_key(&meta).as_str() {
                    "name" => container.name = Some(string_value(&meta)?),
                    "description" => container.description = Some(string_value(&meta)?),
                    _ => return Err(meta.error("expected `name` or `description`")),
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                match meta_key(&meta).as_str() {
                    "rename_all" if meta.input.peek(Token![=]) => {
                        let lit: LitStr = meta.value()?.parse()?;
                        container.rename_all = Some(RenameRule::parse(&lit)?);
                    }
                    "rename_all" => meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            let lit: LitStr = inner.value()?.parse()?;
                            container.rename_all = Some(RenameRule::parse(&lit)?);
                            Ok(())
                        } else {
                            skip_meta(&inner)
                        }
                    })?,
                    _ => skip_meta(&meta)?,
                }
                Ok(())
            })?;
        }
    }
    Ok(container)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                match meta_key(&meta).as_str() {
                    "json" => parsed.json = Some(string_value(&meta)?),
                    "description" => parsed.description = Some(string_value(&meta)?),
                    "storage" => parsed.storage = Some(string_value(&meta)?),
                    "validate" => parsed.validate = Some(string_value(&meta)?),
                    "enum" => parsed.enum_values = Some(string_value(&meta)?),
                    "inline" => parsed.inline = true,
                    "opaque" => parsed.opaque = true,
                    "skip" => parsed.skip = true,
                    _ => {
                        return Err(meta.error(
                            "unknown record attribute, expected one of: json, description, \
                             storage, validate, enum, inline, opaque, skip",
                        ))
                    }
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                match meta_key(&meta).as_str() {
                    "rename" if meta.input.peek(Token![=]) => {
                        parsed.serde_rename = Some(string_value(&meta)?);
                    }
                    "rename" => meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            parsed.serde_rename = Some(string_value(&inner)?);
                            Ok(())
                        } else {
                            skip_meta(&inner)
                        }
                    })?,
                    "skip" | "skip_serializing" => parsed.serde_skip = true,
                    "flatten" => parsed.serde_flatten = true,
                    _ => skip_meta(&meta)?,
                }
                Ok(())
            })?;
        }
    }
    Ok(parsed)
}

/// `///` lines joined with single spaces.
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

/// Type tokens as compact source text (`Option<Box<Leaf>>`).
fn signature_of(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let glue = |c: char| "<>:,&[];()".contains(c);
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, c) in chars.iter().enumerate() {
        if *c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            if prev.map_or(true, glue) || next.map_or(true, glue) {
                continue;
            }
        }
        out.push(*c);
    }
    out
}

fn last_segment_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            path.path.segments.last().map(|s| s.ident.to_string())
        }
        _ => None,
    }
}

/// Name of the `FieldKind` variant matching the syntax of `ty`.
fn classify(ty: &Type) -> &'static str {
    match ty {
        Type::Reference(reference) => match &*reference.elem {
            Type::Slice(_) => "Slice",
            elem if last_segment_name(elem).as_deref() == Some("str") => "Scalar",
            _ => "Pointer",
        },
        Type::Array(_) | Type::Slice(_) => "Slice",
        Type::Group(group) => classify(&group.elem),
        Type::Paren(paren) => classify(&paren.elem),
        Type::Path(_) => {
            let Some(name) = last_segment_name(ty) else {
                return "Dynamic";
            };
            let name = name.as_str();
            if SCALARS.contains(&name) {
                "Scalar"
            } else if POINTERS.contains(&name) {
                "Pointer"
            } else if SEQUENCES.contains(&name) {
                "Slice"
            } else if MAPS.contains(&name) {
                "Map"
            } else if name == "Value" {
                "Dynamic"
            } else {
                "Struct"
            }
        }
        _ => "Dynamic",
    }
}

/// First generic type argument of a path type (`Option<T>` → `T`).
fn first_type_argument(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

/// The record type behind a struct or pointer field, if it should implement `Record`.
fn record_candidate<'a>(ty: &'a Type, generic_params: &[String]) -> Option<&'a Type> {
    let mut current = ty;
    loop {
        match current {
            Type::Reference(reference) => current = &reference.elem,
            Type::Group(group) => current = &group.elem,
            Type::Paren(paren) => current = &paren.elem,
            Type::Path(_) => {
                let name = last_segment_name(current)?;
                if POINTERS.contains(&name.as_str()) {
                    current = first_type_argument(current)?;
                    continue;
                }
                let skipped = SCALARS.contains(&name.as_str())
                    || SEQUENCES.contains(&name.as_str())
                    || MAPS.contains(&name.as_str())
                    || FOREIGN.contains(&name.as_str())
                    || generic_params.contains(&name);
                return if skipped { None } else { Some(current) };
            }
            _ => return None,
        }
    }
}
