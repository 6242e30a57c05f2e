//! Blocking helpers for running external commands.

use crate::error::{Error, Result};
use log::{debug, trace};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

/// Run `program` with `args`, capture its output and return stdout.
///
/// A non-zero exit becomes [`Error::CommandFailed`] carrying the trimmed stderr.
pub fn run_capture<S: AsRef<OsStr>>(program: impl AsRef<OsStr>, args: &[S]) -> Result<String> {
    let program = program.as_ref();
    let rendered = render(program, args);
    debug!("[cmd] {rendered}");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::io(Path::new(program), e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    trace!("[cmd] stdout: {}", stdout.trim_end());
    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: rendered,
            status: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(stdout)
}

/// Fail early with [`Error::ToolMissing`] when `tool` is not on `PATH`.
pub fn require_tool(tool: &str) -> Result<()> {
    which::which(tool)
        .map(|_| ())
        .map_err(|_| Error::ToolMissing(tool.to_string()))
}

fn render<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut rendered = program.to_string_lossy().into_owned();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}
