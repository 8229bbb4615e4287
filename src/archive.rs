//! kpack archive handling
//!
//! Packages are distributed as kpack archives. This module reads the
//! metadata header directly (enough to rebuild `packages.make`) and delegates
//! extraction to the external `kpack` tool.
//!
//! Header layout:
//!
//! ```text
//! "KPKG"  format:u8  count:u8  { key:u8 len:u8 value[len] } * count  ...files
//! ```

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const MAGIC: &[u8; 4] = b"KPKG";

const KEY_NAME: u8 = 0x00;
const KEY_REPO: u8 = 0x01;
const KEY_DESCRIPTION: u8 = 0x02;
const KEY_VERSION: u8 = 0x04;

/// Metadata recovered from an archive header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub repo: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl PackageInfo {
    /// Read the header of the archive at `path`
    pub fn read_package<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
            .map_err(|e| Error::InvalidArchive(format!("{}: {}", path.display(), e)))
    }

    /// Parse a header from any reader; only the header bytes are consumed
    pub fn read_from<R: Read>(mut reader: R) -> std::result::Result<Self, String> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|_| "truncated header".to_string())?;
        if &magic != MAGIC {
            return Err("not a kpack archive".to_string());
        }

        let mut preamble = [0u8; 2];
        reader
            .read_exact(&mut preamble)
            .map_err(|_| "truncated header".to_string())?;
        let [_format, count] = preamble;

        let mut name = None;
        let mut repo = None;
        let mut version = None;
        let mut description = None;

        for _ in 0..count {
            let mut entry = [0u8; 2];
            reader
                .read_exact(&mut entry)
                .map_err(|_| "truncated metadata entry".to_string())?;
            let [key, len] = entry;

            let mut value = vec![0u8; len as usize];
            reader
                .read_exact(&mut value)
                .map_err(|_| "truncated metadata value".to_string())?;

            match key {
                KEY_NAME => name = Some(String::from_utf8_lossy(&value).into_owned()),
                KEY_REPO => repo = Some(String::from_utf8_lossy(&value).into_owned()),
                KEY_DESCRIPTION => {
                    description = Some(String::from_utf8_lossy(&value).into_owned())
                }
                KEY_VERSION if value.len() == 3 => {
                    version = Some(format!("{}.{}.{}", value[0], value[1], value[2]))
                }
                _ => {}
            }
        }

        Ok(Self {
            name: name.ok_or_else(|| "missing package name".to_string())?,
            repo: repo.ok_or_else(|| "missing package repository".to_string())?,
            version,
            description,
        })
    }
}

/// Unpacks an archive into an install root
///
/// Extraction is fire-and-forget: failures are not reported to the caller.
pub trait Extractor {
    fn extract(&self, archive: &Path, dest: &Path, strip_scripts: bool);
}

/// Extracts with the external `kpack` tool
#[derive(Debug, Clone)]
pub struct KpackExtractor {
    program: PathBuf,
}

impl KpackExtractor {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, archive: &Path, dest: &Path, strip_scripts: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-e");
        if strip_scripts {
            cmd.arg("-s");
        }
        cmd.arg(archive).arg(dest);
        cmd
    }
}

impl Default for KpackExtractor {
    fn default() -> Self {
        Self::new("kpack")
    }
}

impl Extractor for KpackExtractor {
    fn extract(&self, archive: &Path, dest: &Path, strip_scripts: bool) {
        let status = self
            .command(archive, dest, strip_scripts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        // Exit status is only logged
        match status {
            Ok(status) => tracing::debug!(
                archive = %archive.display(),
                strip_scripts,
                %status,
                "kpack finished"
            ),
            Err(e) => tracing::debug!(
                archive = %archive.display(),
                program = %self.program.display(),
                error = %e,
                "could not run kpack"
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Build an archive that starts with a valid kpack header
    pub fn kpack_bytes(name: &str, repo: &str) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 3]);
        bytes.extend_from_slice(&[KEY_NAME, name.len() as u8]);
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(&[KEY_REPO, repo.len() as u8]);
        bytes.extend_from_slice(repo.as_bytes());
        bytes.extend_from_slice(&[KEY_VERSION, 3, 1, 2, 0]);
        bytes.extend_from_slice(b"payload");
        bytes
    }

    /// Records extraction requests instead of running kpack
    #[derive(Default)]
    pub struct RecordingExtractor {
        pub calls: RefCell<Vec<(PathBuf, PathBuf, bool)>>,
    }

    impl Extractor for RecordingExtractor {
        fn extract(&self, archive: &Path, dest: &Path, strip_scripts: bool) {
            self.calls
                .borrow_mut()
                .push((archive.to_path_buf(), dest.to_path_buf(), strip_scripts));
        }
    }
}
