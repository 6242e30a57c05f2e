//! Backends performing the side effects of an installation.
//!
//! The [`Backend`] trait covers every step that touches the outside world:
//! creating directories, downloading, unpacking, marking files executable and
//! asking fly for its version. Two real implementations exist:
//!
//! - [`native::NativeBackend`] does everything in-process (HTTP client, archive
//!   libraries, permission bits).
//! - [`system::SystemBackend`] shells out to `mkdir`, `wget`, `tar`/`unzip` and
//!   `chmod`.
//!
//! # Testing
//!
//! Use [`MockBackend`] to exercise the pipeline without network or processes:
//!
//! ```
//! use flykit::backend::{Backend, MockBackend};
//! use std::path::Path;
//!
//! let mock = MockBackend::new().with_version("/usr/local/bin/fly", "7.9.1");
//! let version = mock.query_version(Path::new("/usr/local/bin/fly")).unwrap();
//! assert_eq!(version, "7.9.1");
//! ```

pub mod native;
pub mod system;

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Side-effecting operations needed to install and query fly.
pub trait Backend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Create `dir` and its parents. An existing directory is not an error.
    fn create_dir(&self, dir: &Path) -> Result<()>;

    /// Download `url` to the file `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Unpack `archive` into `dest_dir`.
    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()>;

    /// Mark `path` as executable.
    fn make_executable(&self, path: &Path) -> Result<()>;

    /// Run `binary --version` and return its output with surrounding newlines trimmed.
    fn query_version(&self, binary: &Path) -> Result<String>;
}

/// Trim the newlines fly prints around its version.
pub(crate) fn trim_version(stdout: &str) -> String {
    stdout.trim_matches('\n').to_string()
}

/// Archive formats fly is distributed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Gzipped tarball (`.tgz`, `.tar.gz`).
    TarGz,
    /// Zip archive (Windows releases).
    Zip,
}

impl ArchiveKind {
    /// Guess the format from a URL; anything that is not a zip is a tarball.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.to_ascii_lowercase().ends_with(".zip") {
            Self::Zip
        } else {
            Self::TarGz
        }
    }

    /// Guess the format from a file name.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zip") => Self::Zip,
            _ => Self::TarGz,
        }
    }

    /// File extension used for the downloaded archive.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tgz",
            Self::Zip => "zip",
        }
    }
}

/// A step performed through a [`MockBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// [`Backend::create_dir`]
    CreateDir,
    /// [`Backend::download`]
    Download,
    /// [`Backend::extract`]
    Extract,
    /// [`Backend::make_executable`]
    MakeExecutable,
    /// [`Backend::query_version`]
    QueryVersion,
}

/// A recorded call on a [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Which operation ran.
    pub step: Step,
    /// The path the operation targeted.
    pub path: PathBuf,
}

/// In-memory backend for tests.
///
/// Records every call, answers `query_version` from a table keyed by binary
/// path and can be told to fail a given step.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    versions: HashMap<PathBuf, String>,
    failures: HashMap<Step, String>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockBackend {
    /// Create a mock with no versions and no failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `version` when `binary` is queried.
    #[must_use]
    pub fn with_version(mut self, binary: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        self.versions.insert(binary.into(), version.into());
        self
    }

    /// Make `step` fail with `message`.
    #[must_use]
    pub fn failing(mut self, step: Step, message: impl Into<String>) -> Self {
        self.failures.insert(step, message.into());
        self
    }

    /// Calls performed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The steps performed so far, in order.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        self.calls().into_iter().map(|call| call.step).collect()
    }

    fn record(&self, step: Step, path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                step,
                path: path.to_path_buf(),
            });
        match self.failures.get(&step) {
            Some(message) => Err(Error::Other(message.clone())),
            None => Ok(()),
        }
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        self.record(Step::CreateDir, dir)
    }

    fn download(&self, _url: &str, dest: &Path) -> Result<()> {
        self.record(Step::Download, dest)
    }

    fn extract(&self, archive: &Path, _dest_dir: &Path) -> Result<()> {
        self.record(Step::Extract, archive)
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        self.record(Step::MakeExecutable, path)
    }

    fn query_version(&self, binary: &Path) -> Result<String> {
        self.record(Step::QueryVersion, binary)?;
        self.versions
            .get(binary)
            .map(|v| trim_version(v))
            .ok_or_else(|| Error::CommandFailed {
                command: format!("{} --version", binary.display()),
                status: Some(127),
                stderr: "not found".to_string(),
            })
    }
}
