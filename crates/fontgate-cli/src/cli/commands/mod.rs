//! CLI command handlers, one per file.

mod completions;
mod describe;
mod fetch;
mod import_catalog;
mod manpage;
mod serve;
mod variants;

pub use completions::run_completions;
pub use describe::run_describe;
pub use fetch::run_fetch;
pub use import_catalog::run_import_catalog;
pub use manpage::run_manpage;
pub use serve::run_serve;
pub use variants::run_variants;
