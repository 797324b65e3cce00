//! Shared templates: every file directly under a template root is
//! registered by its file name, so any file of the tree can pull it in with
//! `{% include "header.txt" %}` or `{% import "macros.txt" as m %}`.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::config::is_config_file;
use crate::renderer::TemplateRenderer;

/// Registers the root-level files of `template_root` into `engine`.
///
/// Descriptors, directories and files that are not UTF-8 are left out. A
/// file that does not compile is skipped with a warning; rendering it as
/// part of the tree reports the error. An unreadable root registers
/// nothing.
///
/// Returns the number of registered templates.
pub fn add_shared_templates(template_root: &Path, engine: &mut dyn TemplateRenderer) -> usize {
    let entries = match fs::read_dir(template_root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No shared templates in {}: {e}", template_root.display());
            return 0;
        }
    };

    let mut count = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if is_config_file(name) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            debug!("Not sharing {}: unreadable or not UTF-8", path.display());
            continue;
        };
        match engine.add_template(name, &content) {
            Ok(()) => {
                debug!("Adding shared template: {name}");
                count += 1;
            }
            Err(e) => warn!("Not sharing {}: {e}", path.display()),
        }
    }
    count
}
