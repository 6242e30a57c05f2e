//! # flykit
//!
//! Library behind the `fly-resource` Concourse resource.
//!
//! This crate provides functionality for:
//! - Decoding resource requests and encoding `check`/`in`/`out` responses
//! - Installing the `fly` CLI from a release archive
//! - Asking an installed `fly` for its version
//! - Deciding whether the observed version differs from the pinned one
//!
//! ## Example
//!
//! ```no_run
//! use flykit::{Resource, ResourceDescriptor};
//!
//! let request = r#"{
//!     "source": {
//!         "path": "/usr/local/bin",
//!         "url": "https://github.com/concourse/concourse/releases/download/v7.9.1/fly-7.9.1-linux-amd64.tgz"
//!     },
//!     "version": { "cli": "7.9.1", "platform": "linux-amd64" }
//! }"#;
//! let descriptor = ResourceDescriptor::from_reader(request.as_bytes()).unwrap();
//!
//! let resource = Resource::new();
//! let installation = resource.install(&descriptor, "downloads").unwrap();
//! println!("installed fly {}", installation.version);
//!
//! let versions = resource.check(&descriptor).unwrap();
//! println!("{}", serde_json::to_string(&versions).unwrap());
//! ```
//!
//! ## Backends
//!
//! | Backend          | Download | Extract          | Chmod          |
//! |------------------|----------|------------------|----------------|
//! | `NativeBackend`  | ureq     | flate2+tar / zip | permission bits|
//! | `SystemBackend`  | `wget`   | `tar` / `unzip`  | `chmod +x`     |
//! | `MockBackend`    | recorded | recorded         | recorded       |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod installer;
pub mod process;
pub mod types;
pub mod version;

pub use error::{Error, ErrorCategory, Result};
pub use installer::{Installation, Installer};
pub use types::{
    CheckResponse, MetadataEntry, PinnedVersion, ResourceDescriptor, Source, VersionRef,
    VersionResponse,
};

use backend::Backend;
pub use backend::MockBackend;
use backend::native::NativeBackend;
use log::info;
use std::path::PathBuf;

/// High-level entry point answering resource requests.
///
/// Wraps a [`Backend`]; the default is [`NativeBackend`].
pub struct Resource {
    backend: Box<dyn Backend>,
}

impl Resource {
    /// Create a resource with the in-process backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: Box::new(NativeBackend::new()),
        }
    }

    /// Create a resource with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Name of the wrapped backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // =========================================================================
    // Installation
    // =========================================================================

    /// Install the archive from `source.url` into `dest_dir`.
    pub fn install(
        &self,
        descriptor: &ResourceDescriptor,
        dest_dir: impl Into<PathBuf>,
    ) -> Result<Installation> {
        Installer::new(self.backend.as_ref(), dest_dir).install(descriptor)
    }

    /// Version reported by the fly binary already present at `source.path`.
    pub fn current_version(&self, descriptor: &ResourceDescriptor) -> Result<String> {
        let binary = installer::binary_in(&descriptor.source.path);
        self.backend.query_version(&binary)
    }

    // =========================================================================
    // Responses
    // =========================================================================

    /// Answer `check`: the pinned version, plus the observed one if it changed.
    pub fn check(&self, descriptor: &ResourceDescriptor) -> Result<CheckResponse> {
        let observed = self.current_version(descriptor)?;
        info!("current fly cli version: {observed}");

        let pinned = &descriptor.version.cli;
        let mut response = vec![VersionRef::new(pinned.clone())];
        if version::has_changed(pinned, &observed) {
            info!("version change detected: {pinned} -> {observed}");
            response.push(VersionRef::new(observed));
        }
        Ok(response)
    }

    /// Answer `out`: the version of the binary at `source.path`.
    pub fn report(&self, descriptor: &ResourceDescriptor) -> Result<VersionResponse> {
        let current = self.current_version(descriptor)?;
        Ok(VersionResponse::new(current, descriptor))
    }
}

impl Default for Resource {
    fn default() -> Self {
        Self::new()
    }
}
