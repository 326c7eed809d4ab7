use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::BatchError;
use crate::capabilities::Capabilities;

/// Audio file found under the corpus root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CorpusFile {
    /// Path relative to the corpus root; sort key.
    pub relative: PathBuf,
    pub path: PathBuf,
}

impl CorpusFile {
    /// Name of the directory holding the file.
    pub fn category(&self) -> String {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File stem used as the sample id.
    pub fn sample_id(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Every accepted audio file under `root`, sorted by relative path.
pub fn collect_corpus(root: &Path, capabilities: &Capabilities) -> Result<Vec<CorpusFile>, BatchError> {
    if !root.is_dir() {
        return Err(BatchError::MissingRoot(root.to_path_buf()));
    }
    let mut files = Vec::new();
    visit_dir(root, &mut |path| {
        if capabilities.accepts(path) {
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.push(CorpusFile {
                relative,
                path: path.to_path_buf(),
            });
        }
    })?;
    files.sort();
    Ok(files)
}

fn visit_dir(root: &Path, visitor: &mut impl FnMut(&Path)) -> Result<(), BatchError> {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if dir != root => {
                warn!(
                    dir = %dir.display(),
                    error = %source,
                    "Failed to read directory during corpus walk"
                );
                continue;
            }
            Err(source) => {
                return Err(BatchError::Io {
                    path: dir.clone(),
                    source,
                });
            }
        };
        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Failed to read file type");
                    continue;
                }
            };
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                visitor(&path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_filters_and_sorts_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("texas/deep")).unwrap();
        fs::create_dir_all(root.join("ohio")).unwrap();
        for rel in ["texas/b.wav", "texas/deep/a.MP3", "ohio/z.ogg", "ohio/notes.txt", "top.m4a"] {
            fs::write(root.join(rel), b"x").unwrap();
        }
        let files = collect_corpus(root, &Capabilities::default()).unwrap();
        let rel: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("ohio/z.ogg"),
                PathBuf::from("texas/b.wav"),
                PathBuf::from("texas/deep/a.MP3"),
                PathBuf::from("top.m4a"),
            ]
        );
        assert_eq!(files[1].category(), "texas");
        assert_eq!(files[1].sample_id(), "b");
    }

    #[test]
    fn missing_root_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            collect_corpus(&missing, &Capabilities::default()),
            Err(BatchError::MissingRoot(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("outside.wav"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("outside.wav"), root.join("link.wav")).unwrap();
        assert!(collect_corpus(&root, &Capabilities::default()).unwrap().is_empty());
    }
}
