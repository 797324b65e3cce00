#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use sprout::context::Context;
use walkdir::WalkDir;

/// Writes `files` (relative path, content) under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Every path under `root`, relative and `/`-separated.
pub fn collect_paths(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            entry.path().strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/")
        })
        .collect()
}

pub fn context(vars: &[(&str, &str)]) -> Context {
    vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
