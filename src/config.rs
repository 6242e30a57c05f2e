//! Runtime configuration assembled once from the command line.

use crate::cli::{BackendArg, Cli, Command};
use flykit::Resource;
use flykit::backend::native::NativeBackend;
use flykit::backend::system::SystemBackend;
use log::warn;
use std::path::PathBuf;

/// Used when the destination argument is an empty string.
pub const DEFAULT_DEST: &str = "downloads";

/// Everything a command handler needs, validated at the boundary.
pub struct Context {
    /// Which resource operation to answer.
    pub command: Command,
    /// Directory the archive is installed into.
    pub dest_dir: PathBuf,
    /// Resource wrapping the selected backend.
    pub resource: Resource,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        let resource = match cli.backend {
            BackendArg::Native => Resource::with_backend(Box::new(NativeBackend::new())),
            BackendArg::System => Resource::with_backend(Box::new(SystemBackend::new())),
        };
        Self::new(cli.command.clone(), resource)
    }

    pub fn new(command: Command, resource: Resource) -> Self {
        let mut dest_dir = command.dest().destination.clone();
        if dest_dir.as_os_str().is_empty() {
            warn!("empty destination directory, using {DEFAULT_DEST}");
            dest_dir = PathBuf::from(DEFAULT_DEST);
        }
        Self {
            command,
            dest_dir,
            resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DestArgs;
    use clap::Parser;

    #[test]
    fn test_from_cli_selects_backend() {
        let cli = Cli::try_parse_from(["fly-resource", "--backend", "system", "in", "out-dir"])
            .unwrap();
        let ctx = Context::from_cli(&cli);
        assert_eq!(ctx.resource.backend_name(), "system");
        assert_eq!(ctx.dest_dir, PathBuf::from("out-dir"));
    }

    #[test]
    fn test_empty_destination_falls_back() {
        let command = Command::Check(DestArgs {
            destination: PathBuf::new(),
        });
        let ctx = Context::new(command, Resource::default());
        assert_eq!(ctx.dest_dir, PathBuf::from(DEFAULT_DEST));
    }
}
