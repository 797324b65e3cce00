//! Error handling for the sprout application.
//! Defines the error type returned by every fallible operation and the
//! handler used by the binary to report it.

use std::io;
use thiserror::Error;

/// Custom error types for sprout operations.
///
/// Descriptor problems are not represented here: they are reported as
/// warnings and never abort a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A required argument resolved to an empty value.
    #[error("-{name} option is required.")]
    MissingRequiredArgument { name: String },

    /// Command line arguments of a template command could not be parsed.
    #[error("{0}")]
    ArgumentError(#[from] clap::Error),

    #[error("Cannot read template directory '{template_dir}': {source}.")]
    TemplateRootUnreadable { template_dir: String, source: io::Error },

    /// A directory below the template root could not be listed.
    /// Only the affected subtree is skipped.
    #[error("Cannot read template directory '{path}': {source}.")]
    DirectoryReadError { path: String, source: io::Error },

    #[error("Cannot read template file '{path}': {source}.")]
    ReadError { path: String, source: io::Error },

    #[error("Cannot write '{path}': {source}.")]
    WriteError { path: String, source: io::Error },

    /// Template compilation or rendering failed.
    #[error("Failed to render '{name}'. Original error: {source}")]
    RenderError { name: String, source: minijinja::Error },

    #[error("Rendered path '{rendered}' of '{source_path}' is not a valid relative path.")]
    InvalidRenderedPath { source_path: String, rendered: String },
}

/// Convenience type alias for Results with sprout's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
