//! Compressed named-array archives (`.npz` layout: a zip of `.npy` members).

mod npy;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, ArrayViewD};
use thiserror::Error;

/// File extension of feature archives.
pub const ARCHIVE_EXTENSION: &str = "npz";
const MEMBER_SUFFIX: &str = ".npy";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Zip error in {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("Failed to move archive into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
    #[error("Archive member {member} in {path} is invalid: {reason}")]
    Member {
        path: PathBuf,
        member: String,
        reason: String,
    },
}

/// Arrays read back from an archive, in member order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureArchive {
    members: Vec<(String, ArrayD<f32>)>,
}

impl FeatureArchive {
    pub fn get(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, array)| array)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Write `arrays` to `path` as deflated `<name>.npy` members.
///
/// The archive is assembled in a temp file next to `path` and renamed into
/// place, so a crash never leaves a partial archive behind.
pub fn write_archive(path: &Path, arrays: &[(&str, ArrayViewD<'_, f32>)]) -> Result<(), ArchiveError> {
    let io_err = |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    };
    let zip_err = |source| ArchiveError::Zip {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    let mut temp = tempfile::Builder::new()
        .prefix(".speechprep-archive")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    {
        let mut zip = zip::ZipWriter::new(BufWriter::new(temp.as_file_mut()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, array) in arrays {
            zip.start_file(format!("{name}{MEMBER_SUFFIX}"), options)
                .map_err(zip_err)?;
            zip.write_all(&npy::encode(array)).map_err(io_err)?;
        }
        let mut writer = zip.finish().map_err(zip_err)?;
        writer.flush().map_err(io_err)?;
    }
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|source| ArchiveError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read every `.npy` member of an archive written by [`write_archive`].
pub fn read_archive(path: &Path) -> Result<FeatureArchive, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|source| ArchiveError::Zip {
        path: path.to_path_buf(),
        source,
    })?;
    let mut members = Vec::with_capacity(zip.len());
    for idx in 0..zip.len() {
        let mut entry = zip.by_index(idx).map_err(|source| ArchiveError::Zip {
            path: path.to_path_buf(),
            source,
        })?;
        let entry_name = entry.name().to_string();
        let Some(name) = entry_name.strip_suffix(MEMBER_SUFFIX) else {
            continue;
        };
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| ArchiveError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let array = npy::decode(&bytes).map_err(|reason| ArchiveError::Member {
            path: path.to_path_buf(),
            member: entry_name.clone(),
            reason,
        })?;
        members.push((name.to_string(), array));
    }
    Ok(FeatureArchive { members })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    fn write_then_read_preserves_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clip.npz");
        let wave = Array1::from(vec![0.1_f32, -0.2, 0.3]);
        let grid = Array2::from_shape_fn((2, 4), |(r, c)| (r * 4 + c) as f32 / 7.0);
        write_archive(
            &path,
            &[
                ("waveform", wave.view().into_dyn()),
                ("mfcc", grid.view().into_dyn()),
            ],
        )
        .unwrap();
        let archive = read_archive(&path).unwrap();
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["waveform", "mfcc"]);
        assert_eq!(archive.get("waveform"), Some(&wave.into_dyn()));
        assert_eq!(archive.get("mfcc"), Some(&grid.into_dyn()));
    }

    #[test]
    fn no_temp_files_remain_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.npz");
        let values = Array1::from(vec![1.0_f32; 16]);
        write_archive(&path, &[("rms", values.view().into_dyn())]).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("clip.npz")]);
    }

    #[test]
    fn garbage_file_is_a_zip_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.npz");
        fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(read_archive(&path), Err(ArchiveError::Zip { .. })));
    }
}
