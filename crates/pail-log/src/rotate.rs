use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::LogError;

/// Append-only log file that rolls over by size.
///
/// Before a write that would bring the file to `max_bytes` or beyond, the
/// current file becomes `<path>.1`, `<path>.1` becomes `<path>.2`, and so on
/// up to `backup_count`; the oldest backup is discarded. A zero `max_bytes`
/// or `backup_count` disables rollover.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    len: u64,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> Result<Self, LogError> {
        let path = path.into();
        let (file, len) = open_append(&path).map_err(|source| LogError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn should_roll(&self, incoming: usize) -> bool {
        self.max_bytes > 0
            && self.backup_count > 0
            && self.len > 0
            && self.len + incoming as u64 >= self.max_bytes
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let oldest = backup_path(&self.path, self.backup_count);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.backup_count).rev() {
            let from = backup_path(&self.path, n);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, n + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))?;
        let (file, len) = open_append(&self.path)?;
        self.file = file;
        self.len = len;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_roll(buf.len()) {
            self.roll()?;
        }
        let written = self.file.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// `<path>.<n>`, e.g. `logs/pail.log.2`.
pub fn backup_path(path: &Path, n: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}
