//! Expansion of command-line paths into container files.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Extension of the containers this tool remuxes.
pub const CONTAINER_EXTENSION: &str = "mkv";

/// Container files selected from the command line, plus paths that were rejected.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Inputs {
    pub files: Vec<Utf8PathBuf>,
    pub invalid: Vec<Utf8PathBuf>,
}

pub fn is_container(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
}

/// Directories contribute their direct `.mkv` children (sorted by name);
/// `.mkv` files are taken as-is; anything else is reported as invalid.
pub fn collect_inputs(paths: &[Utf8PathBuf]) -> Result<Inputs> {
    let mut inputs = Inputs::default();

    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in path
                .read_dir_utf8()
                .with_context(|| format!("Failed to read directory: {}", path))?
            {
                let entry = entry.with_context(|| format!("Failed to read entry in {}", path))?;
                let child = entry.path();
                if child.is_file() && is_container(child) {
                    found.push(child.to_path_buf());
                }
            }
            found.sort();
            tracing::debug!("{} containers in {}", found.len(), path);
            inputs.files.extend(found);
        } else if path.is_file() && is_container(path) {
            inputs.files.push(path.clone());
        } else {
            tracing::warn!("Invalid path: {}", path);
            inputs.invalid.push(path.clone());
        }
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_inputs() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        fs::write(dir.join("b.mkv"), b"").unwrap();
        fs::write(dir.join("a.MKV"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();
        fs::create_dir_all(dir.join("subs")).unwrap();
        fs::write(dir.join("subs/c.mkv"), b"").unwrap();

        let single = dir.join("subs/c.mkv");
        let bogus = dir.join("notes.txt");
        let inputs = collect_inputs(&[dir.clone(), single.clone(), bogus.clone()]).unwrap();

        assert_eq!(
            inputs.files,
            vec![dir.join("a.MKV"), dir.join("b.mkv"), single]
        );
        assert_eq!(inputs.invalid, vec![bogus]);
    }

    #[test]
    fn test_missing_path_is_invalid() {
        let inputs = collect_inputs(&[Utf8PathBuf::from("/does/not/exist.mkv")]).unwrap();
        assert!(inputs.files.is_empty());
        assert_eq!(inputs.invalid.len(), 1);
    }
}
