use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` (parents included) if needed and checks that files can be
/// created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |err: io::Error| PersistError::OutputDir(format!("{}: {err}", dir.display()));
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )))
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(unusable)?;
        }
        Err(err) => return Err(unusable(err)),
    }
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}

/// Writes files into one directory via temp file plus rename, so readers
/// never see a half-written post or image.
///
/// The directory is checked on first use only; if it disappears later,
/// writes fail with [`PersistError::Io`].
pub struct AtomicFileWriter {
    dir: PathBuf,
    ready: AtomicBool,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            ready: AtomicBool::new(false),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Runs [`ensure_output_dir`] unless an earlier call already succeeded.
    pub fn prepare(&self) -> Result<(), PersistError> {
        if !self.ready.load(Ordering::Acquire) {
            ensure_output_dir(&self.dir)?;
            self.ready.store(true, Ordering::Release);
        }
        Ok(())
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        self.write_bytes(filename, content.as_bytes())
    }

    /// Replaces `<dir>/<filename>` with `bytes`.
    pub fn write_bytes(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        self.prepare()?;

        let target = self.dir.join(filename);
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;
        staged.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        staged
            .persist(&target)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}
