//! `check`: compare the pinned version with the fly already on the worker.

use super::emit;
use crate::config::Context;
use anyhow::{Context as _, Result};
use flykit::ResourceDescriptor;
use std::io::Write;

pub fn run(ctx: &Context, descriptor: &ResourceDescriptor, out: &mut impl Write) -> Result<()> {
    let response = ctx
        .resource
        .check(descriptor)
        .with_context(|| format!("Failed to get fly version from {}", descriptor.source.path))?;
    emit(out, &response)
}
