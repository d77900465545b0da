//! Finding the little images from a glob pattern.

use std::path::PathBuf;

use crate::error::Error;

/// Regular files matching `pattern`, in lexicographic path order.
///
/// An empty result is not an error here.
pub fn little_files(pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let entries = glob::glob(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_owned(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}
