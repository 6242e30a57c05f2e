//! In-process backend.
//!
//! Downloads with ureq, unpacks with flate2/tar or zip and sets permission
//! bits directly. Only the version query spawns a process (fly itself).

use crate::backend::{ArchiveKind, Backend, trim_version};
use crate::error::{Error, Result};
use crate::process;
use flate2::read::GzDecoder;
use log::debug;
use std::fs;
use std::path::Path;
use tar::Archive;

/// Maximum archive size (fly releases are well under this).
const MAX_BODY_SIZE: u64 = 256 * 1024 * 1024;

const USER_AGENT: &str = concat!("flykit/", env!("CARGO_PKG_VERSION"));

/// Backend that performs every step without external utilities.
pub struct NativeBackend {
    agent: ureq::Agent,
}

impl NativeBackend {
    /// Create a backend with a default HTTP agent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self
            .agent
            .get(url)
            .header("Accept", "application/octet-stream")
            .header("User-Agent", USER_AGENT)
            .call()?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()
            .map_err(|e| Error::DownloadFailed {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn extract_targz(archive: &Path, dest_dir: &Path) -> Result<()> {
        let file = fs::File::open(archive).map_err(|e| Error::io(archive, e))?;
        let mut tarball = Archive::new(GzDecoder::new(file));
        tarball
            .unpack(dest_dir)
            .map_err(|e| Error::extraction(archive, e))
    }

    fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<()> {
        let file = fs::File::open(archive).map_err(|e| Error::io(archive, e))?;
        let mut zipped = zip::ZipArchive::new(file).map_err(|e| Error::extraction(archive, e))?;
        zipped
            .extract(dest_dir)
            .map_err(|e| Error::extraction(archive, e))
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        // Local mirrors are copied rather than fetched.
        if let Some(local) = url.strip_prefix("file://") {
            debug!("native: copying {local} to {}", dest.display());
            fs::copy(local, dest).map_err(|e| Error::io(local, e))?;
            return Ok(());
        }

        debug!("native: downloading {url} to {}", dest.display());
        let bytes = self.fetch(url)?;
        fs::write(dest, &bytes).map_err(|e| Error::io(dest, e))
    }

    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        debug!(
            "native: extracting {} into {}",
            archive.display(),
            dest_dir.display()
        );
        if ArchiveKind::from_path(archive) == ArchiveKind::Zip {
            Self::extract_zip(archive, dest_dir)
        } else {
            Self::extract_targz(archive, dest_dir)
        }
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .map_err(|e| Error::io(path, e))?
                .permissions();
            perms.set_mode(perms.mode() | 0o755);
            fs::set_permissions(path, perms).map_err(|e| Error::io(path, e))?;
        }
        #[cfg(not(unix))]
        {
            fs::metadata(path).map_err(|e| Error::io(path, e))?;
        }
        Ok(())
    }

    fn query_version(&self, binary: &Path) -> Result<String> {
        let stdout = process::run_capture(binary, &["--version"])?;
        Ok(trim_version(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::serve_once;
    use crate::error::ErrorCategory;
    use std::io::Write;
    use tempfile::TempDir;

    const FAKE_FLY: &[u8] = b"#!/bin/sh\necho 7.9.1\n";

    fn build_targz(name: &str, data: &[u8], mode: u32) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        {
            let mut builder = tar::Builder::new(&mut encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(mode);
            header.set_cksum();
            builder.append_data(&mut header, name, data).unwrap();
            builder.finish().unwrap();
        }
        encoder.finish().unwrap()
    }

    fn build_zip(name: &str, data: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_create_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("downloads").join("nested");
        let backend = NativeBackend::new();
        backend.create_dir(&dir).unwrap();
        backend.create_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_download_from_file_url() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("mirror.tgz");
        fs::write(&source, b"archive bytes").unwrap();
        let dest = temp.path().join("fly-cli-linux-amd64.tgz");

        let url = format!("file://{}", source.display());
        NativeBackend::new().download(&url, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"archive bytes");
    }

    #[test]
    fn test_download_over_http() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("fly-cli-linux-amd64.tgz");

        let url = serve_once("200 OK", b"archive bytes");
        NativeBackend::new().download(&url, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"archive bytes");
    }

    #[test]
    fn test_download_http_not_found_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("fly-cli-linux-amd64.tgz");

        let url = serve_once("404 Not Found", b"");
        let err = NativeBackend::new().download(&url, &dest).unwrap_err();
        assert!(matches!(err, Error::Http { status: Some(404), .. }));
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(!dest.exists());
    }

    #[test]
    fn test_download_missing_file_url() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("fly.tgz");
        let result = NativeBackend::new().download("file:///nonexistent/fly.tgz", &dest);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_extract_targz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fly-cli-linux-amd64.tgz");
        fs::write(&archive, build_targz("fly", FAKE_FLY, 0o644)).unwrap();

        NativeBackend::new().extract(&archive, temp.path()).unwrap();
        assert_eq!(fs::read(temp.path().join("fly")).unwrap(), FAKE_FLY);
    }

    #[test]
    fn test_extract_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fly-cli-windows-amd64.zip");
        fs::write(&archive, build_zip("fly.exe", b"MZ")).unwrap();

        NativeBackend::new().extract(&archive, temp.path()).unwrap();
        assert_eq!(fs::read(temp.path().join("fly.exe")).unwrap(), b"MZ");
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fly-cli-linux-amd64.tgz");
        fs::write(&archive, b"not a tarball").unwrap();

        let result = NativeBackend::new().extract(&archive, temp.path());
        assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    }

    #[test]
    fn test_make_executable_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = NativeBackend::new().make_executable(&temp.path().join("fly"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_chmod_and_query_version() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fly-cli-linux-amd64.tgz");
        fs::write(&archive, build_targz("fly", FAKE_FLY, 0o644)).unwrap();

        let backend = NativeBackend::new();
        let binary = temp.path().join("fly");
        backend.extract(&archive, temp.path()).unwrap();
        backend.make_executable(&binary).unwrap();

        let mode = fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
        assert_eq!(backend.query_version(&binary).unwrap(), "7.9.1");
    }

    #[cfg(unix)]
    #[test]
    fn test_query_version_failing_binary() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let binary = temp.path().join("fly");
        fs::write(&binary, b"#!/bin/sh\necho broken >&2\nexit 1\n").unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        let result = NativeBackend::new().query_version(&binary);
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
    }
}
