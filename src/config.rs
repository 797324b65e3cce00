//! Configuration handling for sprout templates.
//! Each template directory may carry a descriptor (sprout.json, sprout.yaml
//! or sprout.yml) declaring its documentation, delimiters, static variables
//! and argument specs. Loading is lenient: a broken descriptor only produces
//! warnings and the fields that could be read are kept.

use crate::constants::{CONFIG_FILES, POSITIONAL_PREFIX};
use crate::context::Value;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_LEFT_DELIM: &str = "{{";
const DEFAULT_RIGHT_DELIM: &str = "}}";

/// Variable delimiter pair of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    left: String,
    right: String,
}

impl Delimiters {
    /// Creates a delimiter pair. An empty side falls back to its default.
    pub fn new<L: Into<String>, R: Into<String>>(left: L, right: R) -> Self {
        let left = left.into();
        let right = right.into();
        Self {
            left: if left.is_empty() { DEFAULT_LEFT_DELIM.to_string() } else { left },
            right: if right.is_empty() { DEFAULT_RIGHT_DELIM.to_string() } else { right },
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn is_default(&self) -> bool {
        self.left == DEFAULT_LEFT_DELIM && self.right == DEFAULT_RIGHT_DELIM
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_LEFT_DELIM, DEFAULT_RIGHT_DELIM)
    }
}

/// How an argument spec is bound on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKey {
    /// `--key=value`
    NamedFlag(String),
    /// The n-th positional value after the template name.
    Positional(usize),
}

impl fmt::Display for ArgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKey::NamedFlag(key) => write!(f, "{key}"),
            ArgKey::Positional(index) => write!(f, "{POSITIONAL_PREFIX}{index}"),
        }
    }
}

impl FromStr for ArgKey {
    type Err = String;

    /// Parses the persisted form: `"$<index>"` or a flag key.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.strip_prefix(POSITIONAL_PREFIX) {
            Some(index) => index
                .parse()
                .map(ArgKey::Positional)
                .map_err(|_| format!("invalid positional key '{s}'")),
            None if s.is_empty() => Err("empty argument key".to_string()),
            None => Ok(ArgKey::NamedFlag(s.to_string())),
        }
    }
}

/// A command line argument declared by a template.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub key: ArgKey,
    /// Variable the resolved value is stored under.
    pub name: String,
    pub doc: String,
    pub default: Option<String>,
    pub required: bool,
}

/// Argument spec as found in the descriptor.
#[derive(Debug, Deserialize)]
struct RawArgSpec {
    #[serde(alias = "key")]
    arg: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    doc: String,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    required: bool,
}

impl RawArgSpec {
    fn into_spec(self) -> std::result::Result<ArgSpec, String> {
        let raw = self;
        let key: ArgKey = raw.arg.parse()?;
        let name = if raw.name.is_empty() {
            match &key {
                ArgKey::NamedFlag(flag) => flag.clone(),
                ArgKey::Positional(_) => {
                    return Err(format!("positional argument '{key}' has no name"))
                }
            }
        } else {
            raw.name
        };
        let default = match raw.default {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                Some(v.to_string())
            }
            Some(other) => return Err(format!("default of '{name}' is not a scalar: {other}")),
        };

        Ok(ArgSpec { key, name, doc: raw.doc, default, required: raw.required })
    }
}

/// Template descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub doc: String,
    pub delimiters: Delimiters,
    /// Static variables.
    pub vars: IndexMap<String, Value>,
    /// Ordered: positional binding follows this order.
    pub args: Vec<ArgSpec>,
}

/// Descriptor serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

/// Field names are matched like Go's encoding/json does, case-insensitively,
/// and additionally ignoring `_` and `-`.
fn normalize_key(key: &str) -> String {
    key.chars().filter(|c| *c != '_' && *c != '-').flat_map(char::to_lowercase).collect()
}

fn normalize_object(
    object: serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    object.into_iter().map(|(k, v)| (normalize_key(&k), v)).collect()
}

fn parse_field<T: for<'de> Deserialize<'de>>(
    fields: &serde_json::Map<String, serde_json::Value>,
    name: &str,
    warnings: &mut Vec<String>,
) -> Option<T> {
    let value = fields.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warnings.push(format!("ignoring field '{name}': {e}"));
            None
        }
    }
}

fn parse_args(value: &serde_json::Value, warnings: &mut Vec<String>) -> Vec<ArgSpec> {
    let Some(items) = value.as_array() else {
        warnings.push("ignoring field 'args': expected a list".to_string());
        return Vec::new();
    };

    let mut args = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let parsed = match item {
            serde_json::Value::Object(object) => {
                serde_json::from_value::<RawArgSpec>(serde_json::Value::Object(
                    normalize_object(object.clone()),
                ))
                .map_err(|e| e.to_string())
                .and_then(RawArgSpec::into_spec)
            }
            _ => Err("expected an object".to_string()),
        };
        match parsed {
            Ok(spec) => args.push(spec),
            Err(e) => warnings.push(format!("ignoring argument #{i}: {e}")),
        }
    }
    args
}

/// Parses descriptor content.
///
/// Never fails: returns the config built from every field that could be
/// read, along with one warning per problem found.
pub fn parse_config(content: &str, format: Format) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let mut config = Config::default();

    let document: std::result::Result<serde_json::Value, String> = match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    let fields = match document {
        Ok(serde_json::Value::Object(object)) => normalize_object(object),
        Ok(serde_json::Value::Null) => return (config, warnings),
        Ok(_) => {
            warnings.push("descriptor is not a mapping".to_string());
            return (config, warnings);
        }
        Err(e) => {
            warnings.push(e);
            return (config, warnings);
        }
    };

    if let Some(doc) = parse_field::<String>(&fields, "doc", &mut warnings) {
        config.doc = doc;
    }
    let left = parse_field::<String>(&fields, "leftdelim", &mut warnings).unwrap_or_default();
    let right = parse_field::<String>(&fields, "rightdelim", &mut warnings).unwrap_or_default();
    config.delimiters = Delimiters::new(left, right);

    if let Some(vars) =
        parse_field::<IndexMap<String, serde_json::Value>>(&fields, "vars", &mut warnings)
    {
        config.vars = vars.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
    }
    if let Some(args) = fields.get("args") {
        config.args = parse_args(args, &mut warnings);
    }

    (config, warnings)
}

/// Returns the descriptor path of a template directory, if there is one.
pub fn find_config<P: AsRef<Path>>(template_dir: P) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|file| template_dir.as_ref().join(file))
        .find(|path| path.is_file())
}

/// Whether `file_name` is one of the reserved descriptor names.
pub fn is_config_file(file_name: &str) -> bool {
    CONFIG_FILES.contains(&file_name)
}

/// Loads the descriptor of a template directory.
///
/// A missing descriptor yields `Config::default()`; an unreadable or
/// malformed one is reported with `warn!` and whatever could be parsed is
/// kept.
pub fn load_config<P: AsRef<Path>>(template_dir: P) -> Config {
    let Some(path) = find_config(&template_dir) else {
        debug!("No descriptor in {}", template_dir.as_ref().display());
        return Config::default();
    };

    debug!("Loading descriptor from {}", path.display());
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            return Config::default();
        }
    };

    let (config, warnings) = parse_config(&content, Format::from_path(&path));
    for warning in warnings {
        warn!("{}: {}", path.display(), warning);
    }
    config
}

/// A template available under the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub name: String,
    pub doc: String,
}

/// Lists the templates (sub-directories) of `templates_root`, sorted by name.
///
/// # Errors
/// * `Error::TemplateRootUnreadable` if the root cannot be listed
pub fn list_templates<P: AsRef<Path>>(templates_root: P) -> Result<Vec<TemplateSummary>> {
    let root = templates_root.as_ref();
    let entries = std::fs::read_dir(root).map_err(|source| Error::TemplateRootUnreadable {
        template_dir: root.display().to_string(),
        source,
    })?;

    let mut templates: Vec<TemplateSummary> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| TemplateSummary {
            name: entry.file_name().to_string_lossy().into_owned(),
            doc: load_config(entry.path()).doc,
        })
        .collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_descriptor() {
        let content = r#"{
            "Doc": "A library skeleton",
            "LeftDelim": "[[",
            "RightDelim": "]]",
            "Vars": {"license": "MIT", "edition": 2021, "features": ["std"]},
            "Args": [
                {"Arg": "$0", "Name": "name", "Doc": "Crate name", "Required": true},
                {"Arg": "author", "Name": "author", "Doc": "Author", "default": "anonymous"}
            ]
        }"#;
        let (config, warnings) = parse_config(content, Format::Json);

        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.doc, "A library skeleton");
        assert_eq!(config.delimiters, Delimiters::new("[[", "]]"));
        assert_eq!(config.vars.get("license"), Some(&Value::Text("MIT".into())));
        assert_eq!(config.vars.get("edition"), Some(&Value::Number(2021.into())));
        assert_eq!(config.vars.get("features"), Some(&Value::Structured(json!(["std"]))));
        assert_eq!(
            config.args,
            vec![
                ArgSpec {
                    key: ArgKey::Positional(0),
                    name: "name".into(),
                    doc: "Crate name".into(),
                    default: None,
                    required: true,
                },
                ArgSpec {
                    key: ArgKey::NamedFlag("author".into()),
                    name: "author".into(),
                    doc: "Author".into(),
                    default: Some("anonymous".into()),
                    required: false,
                },
            ]
        );
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        let content = r#"{"doc": "x", "left_delim": "<<", "right-delim": ">>"}"#;
        let (config, warnings) = parse_config(content, Format::Json);
        assert!(warnings.is_empty());
        assert_eq!(config.doc, "x");
        assert_eq!(config.delimiters.left(), "<<");
        assert_eq!(config.delimiters.right(), ">>");
    }

    #[test]
    fn test_yaml_descriptor() {
        let content = "doc: From yaml\nargs:\n  - key: port\n    default: 8080\n";
        let (config, warnings) = parse_config(content, Format::Yaml);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.doc, "From yaml");
        assert_eq!(config.args[0].key, ArgKey::NamedFlag("port".into()));
        assert_eq!(config.args[0].name, "port");
        assert_eq!(config.args[0].default.as_deref(), Some("8080"));
    }

    #[test]
    fn test_malformed_document_falls_back_to_defaults() {
        let (config, warnings) = parse_config("{ not json", Format::Json);
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_malformed_fields_are_skipped() {
        let content = r#"{
            "doc": 42,
            "vars": {"a": "b"},
            "args": [{"arg": "$x", "name": "bad"}, {"arg": "good"}, "nope"]
        }"#;
        let (config, warnings) = parse_config(content, Format::Json);

        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config.doc, "");
        assert_eq!(config.vars.len(), 1);
        assert_eq!(config.args.len(), 1);
        assert_eq!(config.args[0].name, "good");
    }

    #[test]
    fn test_empty_delimiters_use_defaults() {
        let (config, _) = parse_config(r#"{"LeftDelim": "", "RightDelim": ""}"#, Format::Json);
        assert!(config.delimiters.is_default());
    }

    #[test]
    fn test_arg_key_round_trip_display() {
        assert_eq!("$2".parse::<ArgKey>(), Ok(ArgKey::Positional(2)));
        assert_eq!(ArgKey::Positional(2).to_string(), "$2");
        assert_eq!("name".parse::<ArgKey>(), Ok(ArgKey::NamedFlag("name".into())));
        assert!("".parse::<ArgKey>().is_err());
        assert!("$".parse::<ArgKey>().is_err());
    }
}
