use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fly-resource")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Concourse resource that installs the fly CLI and reports its version", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// How downloads, extraction and chmod are performed
    #[arg(
        long,
        value_enum,
        default_value_t = BackendArg::Native,
        env = "FLY_RESOURCE_BACKEND",
        global = true
    )]
    pub backend: BackendArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report the pinned version, plus the installed one if it differs
    Check(DestArgs),

    /// Install fly and report the installed version
    #[command(name = "in")]
    In(DestArgs),

    /// Report the version of the fly binary at source.path
    Out(DestArgs),
}

impl Command {
    pub fn dest(&self) -> &DestArgs {
        match self {
            Self::Check(args) | Self::In(args) | Self::Out(args) => args,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Check(_) => "check",
            Self::In(_) => "in",
            Self::Out(_) => "out",
        }
    }
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct DestArgs {
    /// Directory the fly archive is downloaded and unpacked into
    #[arg(env = "FLY_RESOURCE_DEST", default_value = crate::config::DEFAULT_DEST)]
    pub destination: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// HTTP client and archive libraries, no external tools
    Native,
    /// mkdir, wget, tar/unzip and chmod
    System,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_in_with_destination() {
        let cli = Cli::try_parse_from(["fly-resource", "in", "/tmp/build/get"]).unwrap();
        assert_eq!(cli.command.name(), "in");
        assert_eq!(cli.command.dest().destination, PathBuf::from("/tmp/build/get"));
        assert_eq!(cli.backend, BackendArg::Native);
    }

    #[test]
    fn test_parse_check_default_destination() {
        let cli = Cli::try_parse_from(["fly-resource", "check"]).unwrap();
        assert_eq!(cli.command.name(), "check");
        assert_eq!(cli.command.dest().destination, PathBuf::from("downloads"));
    }

    #[test]
    fn test_parse_backend_and_verbosity() {
        let cli =
            Cli::try_parse_from(["fly-resource", "-vv", "--backend", "system", "out", "dest"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.backend, BackendArg::System);
        assert_eq!(cli.command.name(), "out");
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["fly-resource", "deploy", "dest"]).is_err());
    }

    #[test]
    fn test_missing_command_rejected() {
        assert!(Cli::try_parse_from(["fly-resource"]).is_err());
    }
}
