//! `fontgate variants <family>`: list variant ids and their file URLs.

use crate::cli::app::Resolver;
use anyhow::Result;

pub async fn run_variants(resolver: &Resolver, family: &str) -> Result<()> {
    let descriptor = resolver.descriptor(family)?;
    if descriptor.variants.is_empty() {
        println!("{} has no variants.", descriptor.family);
        return Ok(());
    }
    println!("{:<12} {}", "VARIANT", "URL");
    for (variant, url) in &descriptor.variants {
        println!("{:<12} {}", variant, url);
    }
    Ok(())
}
