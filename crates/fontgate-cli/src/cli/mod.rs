//! CLI for fontgate.

mod app;
mod commands;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use fontgate_core::config;
use std::path::PathBuf;
use std::sync::Arc;

use commands::{
    run_completions, run_describe, run_fetch, run_import_catalog, run_manpage, run_serve,
    run_variants,
};

/// Top-level CLI for fontgate.
#[derive(Debug, Parser)]
#[command(name = "fontgate")]
#[command(about = "fontgate: font catalog, cache and privacy proxy", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the catalog record of a font family as JSON.
    Describe {
        /// Family name, any casing or spacing ("Open Sans", "opensans").
        family: String,
    },

    /// Download one variant of a font family.
    Fetch {
        /// Family name.
        family: String,
        /// Variant id, e.g. "regular", "700", "700italic".
        variant: String,
        /// Output file (default: <family>-<variant>.<ext> in the current directory).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the variants of a font family.
    Variants {
        /// Family name.
        family: String,
    },

    /// Build a directory catalog from a font listing file or URL.
    ImportCatalog {
        /// Listing file or http(s) URL (default: the Google Fonts listing API).
        source: Option<String>,
        /// Directory to write catalog records into.
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
    },

    /// Serve font files and the reverse proxy over HTTP.
    Serve {
        /// Address to listen on (overrides proxy.listen).
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
        /// Path the proxy is mounted at (overrides proxy.local_prefix).
        #[arg(long, value_name = "PATH")]
        prefix: Option<String>,
    },

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page.
    Manpage,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // These two never need config.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell).await,
            CliCommand::Manpage => return run_manpage().await,
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Describe { family } => {
                run_describe(&app::build_resolver(&cfg), &family).await?
            }
            CliCommand::Variants { family } => {
                run_variants(&app::build_resolver(&cfg), &family).await?
            }
            CliCommand::Fetch {
                family,
                variant,
                output,
            } => {
                let resolver = Arc::new(app::build_resolver(&cfg));
                let cache = app::build_cache(&cfg)?;
                run_fetch(
                    resolver,
                    cache,
                    &family,
                    &variant,
                    output.as_deref(),
                    cfg.fetch.request_timeout(),
                )
                .await?;
            }
            CliCommand::ImportCatalog { source, out } => {
                run_import_catalog(source.as_deref(), &out, cfg.fetch.options()).await?;
            }
            CliCommand::Serve { listen, prefix } => run_serve(cfg, listen, prefix).await?,
            CliCommand::Completions { .. } | CliCommand::Manpage => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
