//! `out`: report the version of the fly already present at `source.path`.

use super::emit;
use crate::config::Context;
use anyhow::{Context as _, Result};
use flykit::ResourceDescriptor;
use std::io::Write;

pub fn run(ctx: &Context, descriptor: &ResourceDescriptor, out: &mut impl Write) -> Result<()> {
    let response = ctx
        .resource
        .report(descriptor)
        .with_context(|| format!("Failed to get fly version from {}", descriptor.source.path))?;
    emit(out, &response)
}
