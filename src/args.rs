//! Binds the command line of a template command to the argument specs of
//! its descriptor and produces the variable environment of the run.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, Command};
use indexmap::IndexMap;
use log::{debug, warn};

use crate::config::{ArgKey, ArgSpec, Config};
use crate::constants::{APP_NAME, RESERVED_FLAGS};
use crate::context::Context;
use crate::error::{Error, Result};

const FORCE: &str = "force";
const HELP: &str = "help";
const OUTPUT: &str = "output";
const VALUES: &str = "values";

/// Parsed command line of a template command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Overwrite existing destination files.
    pub force: bool,
    pub help: bool,
    /// Destination root.
    pub output: PathBuf,
    /// Values of the registered named flags, defaults included.
    pub flags: IndexMap<String, String>,
    pub positionals: Vec<String>,
}

impl Default for Invocation {
    fn default() -> Self {
        Self {
            force: false,
            help: false,
            output: PathBuf::from("."),
            flags: IndexMap::new(),
            positionals: Vec::new(),
        }
    }
}

fn flag_id(key: &str) -> String {
    format!("--{key}")
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('-')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Named flag specs that can be registered on the command.
fn registrable_flags(config: &Config) -> Vec<(&str, &ArgSpec)> {
    let mut seen = HashSet::new();
    let mut flags = Vec::new();
    for spec in &config.args {
        let ArgKey::NamedFlag(key) = &spec.key else {
            continue;
        };
        if !is_valid_key(key) {
            warn!("Argument key '{key}' is not a valid flag name; using its default");
        } else if RESERVED_FLAGS.contains(&key.as_str()) {
            warn!("Argument key '{key}' is reserved; using its default");
        } else if !seen.insert(key.as_str()) {
            warn!("Argument key '{key}' is declared twice; only the first one is a flag");
        } else {
            flags.push((key.as_str(), spec));
        }
    }
    flags
}

/// Builds the command of a template: the fixed options plus one option per
/// named flag spec, carrying its default and doc.
pub fn build_command(template: &str, config: &Config) -> Command {
    let mut command = Command::new(template.to_string())
        .bin_name(format!("{APP_NAME} {template}"))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(FORCE)
                .short('f')
                .long(FORCE)
                .action(ArgAction::SetTrue)
                .help("Override existing files"),
        )
        .arg(Arg::new(HELP).long(HELP).action(ArgAction::SetTrue).help("Show command help"))
        .arg(
            Arg::new(OUTPUT)
                .short('o')
                .long(OUTPUT)
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .help("Directory the template is generated into"),
        )
        .arg(Arg::new(VALUES).value_name("VALUES").num_args(0..).action(ArgAction::Append));

    for (key, spec) in registrable_flags(config) {
        let mut arg = Arg::new(flag_id(key))
            .long(key.to_string())
            .value_name(spec.name.clone())
            .help(spec.doc.clone());
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            arg = arg.short(c);
        }
        if let Some(default) = &spec.default {
            arg = arg.default_value(default.clone());
        }
        command = command.arg(arg);
    }
    command
}

/// Parses the arguments following the template name.
///
/// # Errors
/// * `Error::ArgumentError` on unknown flags or malformed values
pub fn parse_invocation<I, T>(template: &str, config: &Config, args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv = std::iter::once(OsString::from(template)).chain(args.into_iter().map(Into::into));
    let matches = build_command(template, config).try_get_matches_from(argv)?;

    let flags = registrable_flags(config)
        .into_iter()
        .filter_map(|(key, _)| {
            matches.get_one::<String>(&flag_id(key)).map(|v| (key.to_string(), v.clone()))
        })
        .collect();

    Ok(Invocation {
        force: matches.get_flag(FORCE),
        help: matches.get_flag(HELP),
        output: matches.get_one::<PathBuf>(OUTPUT).cloned().unwrap_or_else(|| PathBuf::from(".")),
        flags,
        positionals: matches
            .get_many::<String>(VALUES)
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    })
}

/// Resolves every argument spec and merges the results into the static
/// variables of the config.
///
/// A positional spec takes its slot only when the slot is present and not
/// empty, otherwise its default. Specs sharing a name overwrite each other,
/// the last one wins.
///
/// # Errors
/// * `Error::MissingRequiredArgument` if a required spec resolves to an
///   empty value
pub fn resolve(config: &Config, invocation: &Invocation) -> Result<Context> {
    let mut context: Context =
        config.vars.iter().map(|(name, value)| (name.clone(), value.clone())).collect();

    for spec in &config.args {
        let supplied = match &spec.key {
            ArgKey::NamedFlag(key) => invocation.flags.get(key).cloned(),
            ArgKey::Positional(index) => {
                invocation.positionals.get(*index).filter(|v| !v.is_empty()).cloned()
            }
        };
        let value = supplied.or_else(|| spec.default.clone()).unwrap_or_default();

        if value.is_empty() && spec.required {
            return Err(Error::MissingRequiredArgument { name: spec.name.clone() });
        }
        if context.get(&spec.name).is_some() {
            debug!("Argument '{}' replaces an existing variable", spec.name);
        }
        context.insert(spec.name.clone(), value);
    }

    Ok(context)
}

/// Usage text of a template command.
pub fn command_help<P: AsRef<Path>>(template: &str, template_dir: P, config: &Config) -> String {
    let mut out = String::new();
    let _ = write!(out, "Usage:\n  {APP_NAME} {template}");
    for spec in &config.args {
        if let ArgKey::Positional(_) = spec.key {
            let _ = write!(out, " '{}'", spec.name);
        }
    }
    out.push_str("\n\n");
    if !config.doc.is_empty() {
        let _ = writeln!(out, "  {}\n", config.doc);
    }
    out.push_str("  -help: Show command help\n");
    out.push_str("  -f: Override existing files\n");
    out.push_str("  -o=.: Directory the template is generated into\n");
    for spec in &config.args {
        let _ = writeln!(
            out,
            "  -{}={}: '{}'. {} (required:{})",
            spec.key,
            spec.default.as_deref().unwrap_or_default(),
            spec.name,
            spec.doc,
            spec.required
        );
    }
    let _ = writeln!(out, "\n  Template Path: {}", template_dir.as_ref().display());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(key: ArgKey, name: &str, default: Option<&str>, required: bool) -> ArgSpec {
        ArgSpec {
            key,
            name: name.to_string(),
            doc: format!("The {name}"),
            default: default.map(str::to_string),
            required,
        }
    }

    #[test]
    fn test_reserved_and_duplicate_keys_are_not_registered() {
        let config = Config {
            args: vec![
                spec(ArgKey::NamedFlag("f".into()), "a", None, false),
                spec(ArgKey::NamedFlag("bad key".into()), "b", None, false),
                spec(ArgKey::NamedFlag("name".into()), "c", None, false),
                spec(ArgKey::NamedFlag("name".into()), "d", None, false),
            ],
            ..Config::default()
        };
        let flags: Vec<&str> = registrable_flags(&config).into_iter().map(|(k, _)| k).collect();
        assert_eq!(flags, ["name"]);
    }

    #[test]
    fn test_single_char_keys_get_a_short_flag() {
        let config = Config {
            args: vec![spec(ArgKey::NamedFlag("n".into()), "name", None, false)],
            ..Config::default()
        };
        let invocation = parse_invocation("lib", &config, ["-n", "demo"]).unwrap();
        assert_eq!(invocation.flags.get("n").map(String::as_str), Some("demo"));
    }

    #[test]
    fn test_empty_positional_falls_back_to_default() {
        let config = Config {
            args: vec![spec(ArgKey::Positional(0), "name", Some("fallback"), true)],
            ..Config::default()
        };
        let invocation = Invocation { positionals: vec![String::new()], ..Invocation::default() };
        let context = resolve(&config, &invocation).unwrap();
        assert_eq!(context.get("name").and_then(|v| v.as_str()), Some("fallback"));
    }
}
