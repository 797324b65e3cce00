//! sprout scaffolds a directory tree from a template directory tree.
//! Every directory name, file name and file body is rendered against a set
//! of variables built from the template's descriptor and the command line.

/// Binding of command line arguments to the descriptor's argument specs
pub mod args;

/// Command-line interface module for the sprout application
pub mod cli;

/// Template descriptor loading
/// Supports JSON and YAML formats (sprout.json, sprout.yaml, sprout.yml)
pub mod config;

/// Common constants
pub mod constants;

/// The variable environment
pub mod context;

/// Error types and handling for the sprout application
pub mod error;

/// Root-level templates shared with the whole tree
pub mod import;

pub mod logger;

/// Conflict handling for existing destination files
pub mod policy;

/// Tree generation
pub mod processor;

/// Template rendering
pub mod renderer;

/// Naming-convention transforms available in templates
pub mod transforms;
