//! What happens when a destination file already exists.

use std::path::Path;

/// Per-run rule for existing destination files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Leave existing files untouched.
    #[default]
    Skip,
    /// Replace existing files.
    Overwrite,
}

/// Decision taken for a single destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Create,
    Overwrite,
    Skip,
}

impl Decision {
    pub fn writes(self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

impl ConflictPolicy {
    /// `-f` turns overwriting on.
    pub fn from_force(force: bool) -> Self {
        if force {
            ConflictPolicy::Overwrite
        } else {
            ConflictPolicy::Skip
        }
    }

    pub fn decide<P: AsRef<Path>>(&self, target: P) -> Decision {
        match (target.as_ref().exists(), self) {
            (false, _) => Decision::Create,
            (true, ConflictPolicy::Overwrite) => Decision::Overwrite,
            (true, ConflictPolicy::Skip) => Decision::Skip,
        }
    }
}
