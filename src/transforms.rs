//! Naming-convention transforms exposed to templates.
//!
//! The registry is built once and handed to the renderer by reference;
//! every transform is a pure `&str -> String` function.

use cruet::case::{camel::to_camel_case, pascal::to_pascal_case};
use indexmap::IndexMap;

/// Separator of qualified names such as `com.example.Widget`.
const QUALIFIER: char = '.';

/// A transform function usable from templates.
pub type Transform = fn(&str) -> String;

/// Immutable table of named transforms.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    transforms: IndexMap<&'static str, Transform>,
}

impl TransformRegistry {
    /// Creates a registry without any transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full transform library.
    pub fn standard() -> Self {
        Self::new()
            .with("upper", upper)
            .with("lower", lower)
            .with("snake", snake)
            .with("screaming_snake", screaming_snake)
            .with("camel", to_camel_case)
            .with("pascal", to_pascal_case)
            .with("last_segment", last_segment)
            .with("prefix", prefix)
            .with("to_path", to_path)
            .with("prefix_path", prefix_path)
    }

    /// Returns the registry extended with `transform` under `name`.
    pub fn with(mut self, name: &'static str, transform: Transform) -> Self {
        self.transforms.insert(name, transform);
        self
    }

    pub fn get(&self, name: &str) -> Option<Transform> {
        self.transforms.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Transform)> + '_ {
        self.transforms.iter().map(|(name, transform)| (*name, *transform))
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

pub fn upper(s: &str) -> String {
    s.to_uppercase()
}

pub fn lower(s: &str) -> String {
    s.to_lowercase()
}

/// Splits a mixed-case identifier with `separator`.
///
/// A separator goes before every uppercase char that is not the first one
/// and is either preceded or followed by a lowercase char.
fn split_words(s: &str, separator: char) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let after_lower = chars[i - 1].is_lowercase();
            let before_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if after_lower || before_lower {
                out.push(separator);
            }
        }
        out.push(c);
    }
    out
}

/// `FooBar` -> `foo-bar`, `HTTPServer` -> `http-server`.
pub fn snake(s: &str) -> String {
    split_words(s, '-').to_lowercase()
}

/// `FooBar` -> `FOO_BAR`, `HTTPServer` -> `HTTP_SERVER`.
pub fn screaming_snake(s: &str) -> String {
    split_words(s, '_').to_uppercase()
}

/// Substring after the last dot, or the whole input without one.
pub fn last_segment(s: &str) -> String {
    match s.rfind(QUALIFIER) {
        Some(i) => s[i + 1..].to_string(),
        None => s.to_string(),
    }
}

/// Substring before the last dot, or empty without one.
pub fn prefix(s: &str) -> String {
    match s.rfind(QUALIFIER) {
        Some(i) => s[..i].to_string(),
        None => String::new(),
    }
}

pub fn to_path(s: &str) -> String {
    s.replace(QUALIFIER, "/")
}

/// `com.example.Widget` -> `com/example`.
pub fn prefix_path(s: &str) -> String {
    to_path(&prefix(s))
}
