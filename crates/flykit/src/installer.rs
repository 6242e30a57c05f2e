//! Download-and-unpack installation of fly into a destination directory.

use crate::backend::{ArchiveKind, Backend};
use crate::error::Result;
use crate::types::ResourceDescriptor;
use log::{debug, error, info};
use std::path::PathBuf;

/// File name of the fly executable on this platform.
#[must_use]
pub fn binary_name() -> &'static str {
    if cfg!(windows) { "fly.exe" } else { "fly" }
}

/// Location of the fly binary inside `dir`, as `<dir>/fly`.
///
/// The directory is used verbatim, so an empty string yields `/fly` rather
/// than a bare name that would be looked up on `PATH`.
#[must_use]
pub fn binary_in(dir: &str) -> PathBuf {
    PathBuf::from(format!("{}/{}", dir.trim_end_matches('/'), binary_name()))
}

/// Archive file name for a platform, e.g. `fly-cli-linux-amd64.tgz`.
#[must_use]
pub fn archive_name(platform: &str, kind: ArchiveKind) -> String {
    format!("fly-cli-{platform}.{}", kind.extension())
}

/// Outcome of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Path of the installed executable.
    pub binary: PathBuf,
    /// Path of the downloaded archive (left in place).
    pub archive: PathBuf,
    /// Version reported by the freshly installed binary.
    pub version: String,
}

/// Installs fly into a destination directory through a [`Backend`].
pub struct Installer<'a> {
    backend: &'a dyn Backend,
    dest_dir: PathBuf,
}

impl<'a> Installer<'a> {
    /// Create an installer writing into `dest_dir`.
    pub fn new(backend: &'a dyn Backend, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            dest_dir: dest_dir.into(),
        }
    }

    /// Create the directory, download, extract, chmod and query the version.
    ///
    /// Each failing step is logged with its name before the error is returned.
    pub fn install(&self, descriptor: &ResourceDescriptor) -> Result<Installation> {
        let url = descriptor.source.url.as_str();
        let kind = ArchiveKind::from_url(url);
        let archive = self
            .dest_dir
            .join(archive_name(&descriptor.version.platform, kind));
        let binary = self.dest_dir.join(binary_name());

        debug!(
            "install: backend={} dest={}",
            self.backend.name(),
            self.dest_dir.display()
        );

        step("creating destination directory", || {
            self.backend.create_dir(&self.dest_dir)
        })?;
        info!("downloading fly from {url}");
        step("downloading fly cli", || self.backend.download(url, &archive))?;
        step("extracting fly cli archive", || {
            self.backend.extract(&archive, &self.dest_dir)
        })?;
        step("installing fly cli", || self.backend.make_executable(&binary))?;
        let version = step("getting fly cli version", || {
            self.backend.query_version(&binary)
        })?;

        info!("installed fly cli version: {version}");
        Ok(Installation {
            binary,
            archive,
            version,
        })
    }
}

fn step<T>(what: &str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    run().inspect_err(|e| error!("error while {what}: {e}"))
}
