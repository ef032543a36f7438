//! Web-font catalog lookup, variant retrieval and reverse-proxy rewriting.
//!
//! - [`resolver::FontResolver`] looks families up in a [`catalog::CatalogStore`]
//!   and fetches variant files through an injected [`cache::FontCache`].
//! - [`proxy::ReverseProxy`] forwards requests to a font-hosting service and
//!   rewrites asset URLs in its responses to a local path.

pub mod cache;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod proxy;
pub mod resolver;

pub use cache::{DirCache, FontCache, MemoryCache, NoCache};
pub use cancel::CancelToken;
pub use catalog::{normalize_family, FontDescriptor};
pub use resolver::{FontError, FontResolver};
