//! Tree generation: mirrors a template directory into a destination
//! directory, rendering every name and every file body on the way.

use std::fmt;
use std::fs::{self, File, ReadDir};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::is_config_file;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::policy::{ConflictPolicy, Decision};
use crate::renderer::TemplateRenderer;

/// What happened to one destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Overridden,
    LeftUntouched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub action: Action,
    pub target: PathBuf,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.action {
            Action::Created => "Create",
            Action::Overridden => "Override",
            Action::LeftUntouched => "Already exists, left untouched",
        };
        write!(f, "{}: '{}'", label, self.target.display())
    }
}

/// Summary of a generation run.
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    /// Template sub-directories that could not be listed and were skipped.
    pub unreadable: Vec<PathBuf>,
}

impl Report {
    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}

/// A rendered name must stay inside the destination directory.
///
/// # Examples
/// * `"src/lib.rs"` is valid
/// * `""`, `"/etc"`, `"a//b"` and `"../x"` are not
pub fn is_rendered_path_valid(rendered: &str) -> bool {
    !rendered.is_empty()
        && !Path::new(rendered).is_absolute()
        && rendered.split('/').all(|part| !part.is_empty() && part != "..")
}

fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|source| Error::WriteError { path: path.display().to_string(), source })
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let write_error = |source| Error::WriteError { path: path.display().to_string(), source };
    let mut file = File::create(path).map_err(write_error)?;
    file.write_all(content).map_err(write_error)
}

/// Recursively generates a template tree.
pub struct Generator<'a> {
    renderer: &'a dyn TemplateRenderer,
    context: &'a Context,
    template_root: PathBuf,
    policy: ConflictPolicy,
}

impl<'a> Generator<'a> {
    pub fn new<P: AsRef<Path>>(
        renderer: &'a dyn TemplateRenderer,
        context: &'a Context,
        template_root: P,
        policy: ConflictPolicy,
    ) -> Self {
        Self { renderer, context, template_root: template_root.as_ref().to_path_buf(), policy }
    }

    /// Generates the template into `output_root`.
    ///
    /// `notify` receives every file outcome as soon as it is known.
    ///
    /// # Errors
    /// * `Error::TemplateRootUnreadable` if the template root cannot be
    ///   listed; nothing is written in that case
    /// * `Error::RenderError`, `Error::InvalidRenderedPath`,
    ///   `Error::ReadError`, `Error::WriteError` stop the run immediately;
    ///   files written so far are kept
    pub fn generate<P, F>(&self, output_root: P, mut notify: F) -> Result<Report>
    where
        P: AsRef<Path>,
        F: FnMut(&Outcome),
    {
        let entries = fs::read_dir(&self.template_root).map_err(|source| {
            Error::TemplateRootUnreadable {
                template_dir: self.template_root.display().to_string(),
                source,
            }
        })?;

        let output_root = output_root.as_ref();
        create_dir_all(output_root)?;
        debug!(
            "Generating {} into {}",
            self.template_root.display(),
            output_root.display()
        );

        let mut report = Report::default();
        self.process_entries(entries, &self.template_root, output_root, &mut report, &mut notify)?;
        Ok(report)
    }

    fn process_dir(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        report: &mut Report,
        notify: &mut dyn FnMut(&Outcome),
    ) -> Result<()> {
        match fs::read_dir(source_dir) {
            Ok(entries) => {
                create_dir_all(dest_dir)?;
                self.process_entries(entries, source_dir, dest_dir, report, notify)
            }
            Err(source) => {
                let err = Error::DirectoryReadError {
                    path: source_dir.display().to_string(),
                    source,
                };
                warn!("{err} Skipping it.");
                report.unreadable.push(source_dir.to_path_buf());
                Ok(())
            }
        }
    }

    fn process_entries(
        &self,
        entries: ReadDir,
        source_dir: &Path,
        dest_dir: &Path,
        report: &mut Report,
        notify: &mut dyn FnMut(&Outcome),
    ) -> Result<()> {
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let err = Error::DirectoryReadError {
                        path: source_dir.display().to_string(),
                        source,
                    };
                    warn!("{err} Skipping the rest of it.");
                    report.unreadable.push(source_dir.to_path_buf());
                    return Ok(());
                }
            };
            self.process_entry(&entry.path(), source_dir, dest_dir, report, notify)?;
        }
        Ok(())
    }

    fn process_entry(
        &self,
        source_path: &Path,
        source_dir: &Path,
        dest_dir: &Path,
        report: &mut Report,
        notify: &mut dyn FnMut(&Outcome),
    ) -> Result<()> {
        let Some(file_name) = source_path.file_name().and_then(|name| name.to_str()) else {
            warn!("Skipping '{}': name is not valid UTF-8", source_path.display());
            return Ok(());
        };
        let is_dir = source_path.is_dir();

        if !is_dir && source_dir == self.template_root && is_config_file(file_name) {
            debug!("Skipping descriptor {}", source_path.display());
            return Ok(());
        }

        let source_name = source_path.display().to_string();
        let rendered = self.renderer.render(&source_name, file_name, self.context)?;
        if rendered.trim().is_empty() {
            debug!("Skipping '{source_name}': its name renders empty");
            return Ok(());
        }
        if !is_rendered_path_valid(&rendered) {
            return Err(Error::InvalidRenderedPath { source_path: source_name, rendered });
        }

        let target = dest_dir.join(&rendered);
        if is_dir {
            debug!("Directory {} -> {}", source_name, target.display());
            self.process_dir(source_path, &target, report, notify)
        } else {
            let outcome = self.process_file(source_path, &target)?;
            notify(&outcome);
            report.outcomes.push(outcome);
            Ok(())
        }
    }

    fn process_file(&self, source_path: &Path, target: &Path) -> Result<Outcome> {
        let action = match self.policy.decide(target) {
            Decision::Create => Action::Created,
            Decision::Overwrite => Action::Overridden,
            Decision::Skip => {
                return Ok(Outcome { action: Action::LeftUntouched, target: target.to_path_buf() })
            }
        };

        let source_name = source_path.display().to_string();
        let content = fs::read(source_path)
            .map_err(|source| Error::ReadError { path: source_name.clone(), source })?;

        // Rendered in full before the destination is touched.
        let bytes = match String::from_utf8(content) {
            Ok(text) => self.renderer.render(&source_name, &text, self.context)?.into_bytes(),
            Err(e) => {
                debug!("Copying '{source_name}' verbatim: not UTF-8");
                e.into_bytes()
            }
        };

        write_file(target, &bytes)?;
        Ok(Outcome { action, target: target.to_path_buf() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rendered_path_valid() {
        assert!(is_rendered_path_valid("filename.txt"));
        assert!(is_rendered_path_valid("com/example"));
        assert!(!is_rendered_path_valid(""));
        assert!(!is_rendered_path_valid("/filename.txt"));
        assert!(!is_rendered_path_valid("output//filename.txt"));
        assert!(!is_rendered_path_valid("../escape"));
        assert!(!is_rendered_path_valid("trailing/"));
    }

    #[test]
    fn test_outcome_display() {
        let outcome = Outcome { action: Action::Created, target: PathBuf::from("out/a.txt") };
        assert_eq!(outcome.to_string(), "Create: 'out/a.txt'");

        let outcome = Outcome { action: Action::LeftUntouched, target: PathBuf::from("a") };
        assert_eq!(outcome.to_string(), "Already exists, left untouched: 'a'");
    }
}
