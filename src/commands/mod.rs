//! The resource pipeline: read the request, install fly, answer the command.

pub mod check;
pub mod get;
pub mod put;

use crate::config::Context;
use crate::cli::Command;
use anyhow::{Context as _, Result};
use flykit::ResourceDescriptor;
use log::debug;
use serde::Serialize;
use std::io::{Read, Write};

/// Run one invocation against `input` (the request) and `out` (the response).
///
/// The archive is installed before dispatch on every command. Nothing is
/// written to `out` unless the whole pipeline succeeds.
pub fn execute(ctx: &Context, input: impl Read, out: &mut impl Write) -> Result<()> {
    let descriptor =
        ResourceDescriptor::from_reader(input).context("Failed to read resource request")?;
    debug!("request: {descriptor:?}");

    let installation = ctx
        .resource
        .install(&descriptor, &ctx.dest_dir)
        .context("Failed to install fly cli")?;

    match &ctx.command {
        Command::Check(_) => check::run(ctx, &descriptor, out),
        Command::In(_) => get::run(ctx, &descriptor, &installation, out),
        Command::Out(_) => put::run(ctx, &descriptor, out),
    }
}

/// Write `value` as one JSON document followed by a newline.
fn emit<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    let mut document = serde_json::to_vec(value).context("Failed to encode response")?;
    document.push(b'\n');
    out.write_all(&document)
        .and_then(|()| out.flush())
        .context("Failed to write response")
}
