//! `in`: report the version of the fly that was just installed.

use super::emit;
use crate::config::Context;
use anyhow::Result;
use flykit::{Installation, ResourceDescriptor, VersionResponse};
use log::info;
use std::io::Write;

pub fn run(
    ctx: &Context,
    descriptor: &ResourceDescriptor,
    installation: &Installation,
    out: &mut impl Write,
) -> Result<()> {
    info!(
        "fly {} available at {} (archive {} in {})",
        installation.version,
        installation.binary.display(),
        installation.archive.display(),
        ctx.dest_dir.display()
    );
    let response = VersionResponse::new(installation.version.clone(), descriptor);
    emit(out, &response)
}
