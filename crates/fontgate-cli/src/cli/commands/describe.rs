//! `fontgate describe <family>`: print the catalog record as JSON.

use crate::cli::app::Resolver;
use anyhow::Result;

pub async fn run_describe(resolver: &Resolver, family: &str) -> Result<()> {
    let descriptor = resolver.descriptor(family)?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}
