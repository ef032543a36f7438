//! `fontgate manpage`: print the roff man page.

use crate::cli::Cli;
use anyhow::{Context, Result};
use clap::CommandFactory;
use std::io::Write;

pub async fn run_manpage() -> Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    let mut out = Vec::new();
    man.render(&mut out).context("render man page")?;
    std::io::stdout().write_all(&out)?;
    Ok(())
}
