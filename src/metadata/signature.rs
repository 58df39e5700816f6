//! Helpers for normalizing Rust type signatures as captured by `#[derive(Record)]`
//! or written by hand in a schema table.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static LIFETIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'[A-Za-z_][A-Za-z0-9_]*\s*,?\s*").expect("valid lifetime regex"));

#[allow(clippy::expect_used)]
static MUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bmut\s+").expect("valid mut regex"));

#[allow(clippy::expect_used)]
static NAMESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*::").expect("valid namespace regex")
});

/// Wrappers that only add indirection; the wrapped type is what gets emitted.
pub const POINTER_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow", "RefCell", "Cell"];

/// Sequence containers. Without a built-in mapping these resolve to `any`.
pub const SEQUENCE_TYPES: &[&str] = &[
    "Vec",
    "VecDeque",
    "HashSet",
    "BTreeSet",
    "LinkedList",
    "SmallVec",
];

/// Key/value containers.
pub const MAP_TYPES: &[&str] = &["HashMap", "BTreeMap", "IndexMap", "Map"];

pub const INTEGER_TYPES: &[&str] = &[
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
];

pub const SCALAR_TYPES: &[&str] = &[
    "bool", "char", "str", "String", "f32", "f64", "u8", "u16", "u32", "u64", "u128", "usize",
    "i8", "i16", "i32", "i64", "i128", "isize",
];

/// Remove lifetimes, `mut` and all whitespace. Namespaces are kept.
///
/// ```
/// use schemagen::metadata::normalize_signature;
/// assert_eq!(normalize_signature("&'a mut Option < String >"), "&Option<String>");
/// ```
pub fn normalize_signature(signature: &str) -> String {
    let without_lifetimes = LIFETIME_RE.replace_all(signature, "");
    let without_mut = MUT_RE.replace_all(&without_lifetimes, "");
    without_mut.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Drop every `path::` qualifier, keeping generic structure intact.
pub fn strip_namespaces(signature: &str) -> String {
    let stripped = NAMESPACE_RE.replace_all(signature, "");
    stripped.replace("<::", "<").trim_start_matches("::").to_string()
}

/// Peel references and pointer-like wrappers (`Option<Box<T>>` → `T`).
pub fn strip_indirection(signature: &str) -> String {
    let mut current = signature.trim();
    loop {
        if let Some(rest) = current.strip_prefix('&') {
            current = rest;
            continue;
        }
        let mut peeled = false;
        for wrapper in POINTER_WRAPPERS {
            if let Some(inner) = current
                .strip_prefix(wrapper)
                .and_then(|s| s.strip_prefix('<'))
                .and_then(|s| s.strip_suffix('>'))
            {
                current = inner;
                peeled = true;
                break;
            }
        }
        if !peeled {
            return current.to_string();
        }
    }
}

/// The type name without generic arguments (`Page<Account>` → `Page`).
pub fn bare_name(signature: &str) -> &str {
    signature.split('<').next().unwrap_or_default().trim()
}

/// Fully reduce a signature to the name a record would be declared under.
pub fn reduce_signature(signature: &str) -> String {
    strip_indirection(&strip_namespaces(&normalize_signature(signature)))
}
