use camino::{Utf8Path, Utf8PathBuf};

use crate::{Error, FrameNaming, Result};

/// The frame files found in a frames directory.
///
/// Only file names are inspected. Contents, dimensions and gaps in the
/// numbering are left for the encoder to deal with.
#[derive(Debug, Clone)]
pub struct FrameSet {
    dir: Utf8PathBuf,
    files: Vec<String>,
}

impl FrameSet {
    /// List `dir` once and collect the files ending with the frame extension.
    ///
    /// Fails with [Error::DirectoryNotFound] if `dir` is not an existing
    /// directory and with [Error::NoFramesFound] if it contains no frames.
    pub fn scan(dir: &Utf8Path, naming: &FrameNaming) -> Result<Self> {
        match std::fs::metadata(dir) {
            Ok(md) if md.is_dir() => {}
            _ => {
                return Err(Error::DirectoryNotFound {
                    path: dir.to_owned(),
                });
            }
        }

        let suffix = naming.suffix();
        let read_dir_err = |source| Error::ReadDir {
            path: dir.to_owned(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            // Non-UTF8 names cannot match the pattern handed to ffmpeg.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(&suffix) {
                continue;
            }
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            files.push(name);
        }

        if files.is_empty() {
            return Err(Error::NoFramesFound {
                path: dir.to_owned(),
                extension: suffix,
            });
        }
        files.sort();

        tracing::debug!(
            "Found {} frame(s) in \"{dir}\" ({} .. {})",
            files.len(),
            files[0],
            files[files.len() - 1]
        );
        Ok(Self {
            dir: dir.to_owned(),
            files,
        })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Matching file names, sorted.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
