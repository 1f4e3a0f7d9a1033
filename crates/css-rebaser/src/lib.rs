//! Source-map-driven `url(...)` rebasing for compiled CSS.
//!
//! Preprocessors inline partials from many directories into one output file,
//! which breaks relative asset paths written against each partial. This crate
//! uses the output's source map to find which file every `url(...)` came from
//! and rewrites the reference to resolve from that file's directory.
//!
//! # Example
//!
//! ```no_run
//! use css_rebaser::Rebaser;
//!
//! # async fn run(css: &str, map: &[u8]) -> Result<(), css_rebaser::RebaseError> {
//! let result = Rebaser::new().with_map_json(map)?.rebase(css).await?;
//! for record in &result.rebases {
//!     println!("{} -> {}", record.raw, record.rebased);
//! }
//! # Ok(())
//! # }
//! ```

mod classify;
mod error;
mod locate;
pub mod paths;
mod policy;
mod project;
mod rebaser;
mod rewrite;

pub use classify::{classify, is_rebasable, UrlKind};
pub use css_parser::Quote;
pub use error::RebaseError;
pub use locate::{locate, AssetOccurrence};
pub use policy::{
    CallbackPolicy, Decision, DefaultPolicy, Done, PolicyError, PolicyFuture, PrefixRewrite,
    RebasePolicy, RebaseRequest, RulesPolicy,
};
pub use project::project;
pub use rebaser::{RebaseOptions, RebaseResult, Rebaser};
pub use rewrite::{rewrite, RebaseDecision, RebaseRecord, Rewrite};
pub use source_map::{sourcemap, OriginalLocation, SourceMapError, SourceMapResolver};
