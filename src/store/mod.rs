// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for specs.
//!
//! A spec is stored as one JSON document (`version`, `rootGrouping`, `sgfMapping` and the three
//! option bundles). Decoding validates ids, paths and options, so a loaded [`Spec`] is as
//! trustworthy as one built in memory.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{IdError, PathError, Spec, SpecError};

mod spec_json;

pub use spec_json::{from_json_str, spec_json_schema, to_json_string};

/// Reads and decodes the spec at `path`.
pub fn load_spec(path: &Path) -> Result<Spec, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = spec_json::decode(&text).map_err(|err| err.with_path(path))?;
    tracing::debug!(path = %path.display(), games = spec.sgf_mapping().len(), "loaded spec");
    Ok(spec)
}

/// Encodes `spec` and writes it to `path`, replacing any existing file in one rename.
pub fn save_spec(path: &Path, spec: &Spec) -> Result<(), StoreError> {
    let mut text = to_json_string(spec).map_err(|err| err.with_path(path))?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    write_atomic(path, text.as_bytes())?;
    tracing::debug!(path = %path.display(), "saved spec");
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let io_err = |path: &Path, source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name() else {
        return Err(io_err(path, io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")));
    };
    fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(".gobook.tmp.{}.{}", file_name.to_string_lossy(), nanos));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| io_err(&tmp_path, source))?;
    let written = file.write_all(contents).and_then(|()| file.sync_all());
    drop(file);

    let result = written
        .map_err(|source| io_err(&tmp_path, source))
        .and_then(|()| fs::rename(&tmp_path, path).map_err(|source| io_err(path, source)));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    UnsupportedVersion {
        version: String,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    InvalidPath {
        field: &'static str,
        value: String,
        source: Box<PathError>,
    },
    Spec(SpecError),
}

impl StoreError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Json { path: None, source } => Self::Json {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path: Some(path), source } => write!(f, "json error at {path:?}: {source}"),
            Self::Json { path: None, source } => write!(f, "json error: {source}"),
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported spec version {version:?} (expected \"V1\")")
            }
            Self::InvalidId { field, value, source } => {
                write!(f, "invalid {field} {value:?}: {source}")
            }
            Self::InvalidPath { field, value, source } => {
                write!(f, "invalid {field} {value:?}: {source}")
            }
            Self::Spec(err) => write!(f, "invalid spec: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::UnsupportedVersion { .. } => None,
            Self::InvalidId { source, .. } => Some(source.as_ref()),
            Self::InvalidPath { source, .. } => Some(source.as_ref()),
            Self::Spec(err) => Some(err),
        }
    }
}

impl From<SpecError> for StoreError {
    fn from(value: SpecError) -> Self {
        Self::Spec(value)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{load_spec, save_spec, StoreError};
    use crate::model::{BookOptions, DiagramOptions, SgfSource, Spec, SpecOptions};
    use crate::tree::MoveTree;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gobook-store-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn saved_specs_load_back() {
        let spec = Spec::create::<MoveTree>(
            &[SgfSource::new("(;GM[1]GN[Demo];B[aa]C[x])")],
            SpecOptions::default(),
            DiagramOptions::default(),
            BookOptions::default(),
        )
        .expect("spec");

        let dir = temp_dir("roundtrip");
        let path = dir.join("nested").join("book.json");
        save_spec(&path, &spec).expect("save");
        assert!(std::fs::read_to_string(&path).expect("read").ends_with('\n'));

        let loaded = load_spec(&path).expect("load");
        assert_eq!(loaded, spec);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_saves_leave_no_temp_files_behind() {
        let spec = Spec::new(SpecOptions::default(), DiagramOptions::default(), BookOptions::default())
            .expect("spec");
        let dir = temp_dir("failed-save");
        // A non-empty directory where the file should go makes the final rename fail.
        let target = dir.join("book.json");
        std::fs::create_dir_all(target.join("occupied")).expect("mkdir");

        assert!(matches!(save_spec(&target, &spec), Err(StoreError::Io { path, .. }) if path == target));
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .expect("read dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".gobook.tmp."))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_missing_files_and_bad_json_with_their_path() {
        let dir = temp_dir("errors");
        std::fs::create_dir_all(&dir).expect("mkdir");

        let missing = dir.join("missing.json");
        assert!(matches!(load_spec(&missing), Err(StoreError::Io { path, .. }) if path == missing));

        let broken = dir.join("broken.json");
        std::fs::write(&broken, "{ not json").expect("write");
        match load_spec(&broken) {
            Err(StoreError::Json { path: Some(path), .. }) => assert_eq!(path, broken),
            other => panic!("unexpected result: {other:?}"),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
