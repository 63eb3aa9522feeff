use std::path::{Path, PathBuf};

/// Ordered list of directories that asset paths are resolved against.
///
/// Content usually references atlases by a path relative to the data
/// directory, while the binary may be launched from several working
/// directories (`.`, `bin/`, `build/bin/`, ...). The first root that contains
/// the file wins.
#[derive(Clone, Debug, Default)]
pub struct ResourceStorage {
    roots: Vec<PathBuf>,
}

impl ResourceStorage {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { roots: roots.into_iter().map(Into::into).collect() }
    }

    pub fn add_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve `relative` against the roots in order.
    ///
    /// Absolute paths are returned as-is when they exist. Returns `None` when
    /// no root holds the file.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            return relative.exists().then(|| relative.to_path_buf());
        }
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.exists())
    }
}
