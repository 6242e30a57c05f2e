//! Backend delegating to the usual Unix utilities.
//!
//! Each step runs one external command and fails if it exits non-zero. The
//! utility is looked up on `PATH` first so a missing `wget` is reported as
//! such instead of as an opaque spawn error.

use crate::backend::{ArchiveKind, Backend, trim_version};
use crate::error::Result;
use crate::process::{require_tool, run_capture};
use std::ffi::OsStr;
use std::path::Path;

/// Backend built on `mkdir`, `wget`, `tar`, `unzip` and `chmod`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl SystemBackend {
    /// Create a system backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn run(tool: &str, args: &[&OsStr]) -> Result<String> {
        require_tool(tool)?;
        run_capture(tool, args)
    }
}

impl Backend for SystemBackend {
    fn name(&self) -> &'static str {
        "system"
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        Self::run("mkdir", &[OsStr::new("-p"), dir.as_os_str()])?;
        Ok(())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        Self::run(
            "wget",
            &[
                OsStr::new("--quiet"),
                OsStr::new(url),
                OsStr::new("-O"),
                dest.as_os_str(),
            ],
        )?;
        Ok(())
    }

    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        match ArchiveKind::from_path(archive) {
            ArchiveKind::TarGz => Self::run(
                "tar",
                &[
                    OsStr::new("-xzf"),
                    archive.as_os_str(),
                    OsStr::new("-C"),
                    dest_dir.as_os_str(),
                ],
            )?,
            ArchiveKind::Zip => Self::run(
                "unzip",
                &[
                    OsStr::new("-o"),
                    OsStr::new("-q"),
                    archive.as_os_str(),
                    OsStr::new("-d"),
                    dest_dir.as_os_str(),
                ],
            )?,
        };
        Ok(())
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        Self::run("chmod", &[OsStr::new("+x"), path.as_os_str()])?;
        Ok(())
    }

    fn query_version(&self, binary: &Path) -> Result<String> {
        let stdout = run_capture(binary, &["--version"])?;
        Ok(trim_version(&stdout))
    }
}
