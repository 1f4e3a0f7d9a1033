//! The rebasing engine.

use crate::classify::classify;
use crate::error::RebaseError;
use crate::locate::{locate, AssetOccurrence};
use crate::paths;
use crate::policy::{Decision, DefaultPolicy, RebasePolicy, RebaseRequest};
use crate::project::project;
use crate::rewrite::{rewrite, RebaseDecision, RebaseRecord};
use camino::Utf8PathBuf;
use source_map::sourcemap::SourceMap;
use source_map::{LineIndex, SourceMapResolver};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Options for a [`Rebaser`].
#[derive(Debug, Clone, Default)]
pub struct RebaseOptions {
    /// Produce a source map for the rewritten stylesheet.
    pub emit_map: bool,
    /// Directory that absolute source paths are made relative to.
    pub base_dir: Option<Utf8PathBuf>,
}

/// The outcome of a rebase.
#[derive(Debug, Clone)]
pub struct RebaseResult {
    /// The rewritten stylesheet.
    pub css: String,
    /// The source map of the rewritten stylesheet, when requested.
    pub map: Option<SourceMap>,
    /// One record per rewritten reference, in text order.
    pub rebases: Vec<RebaseRecord>,
}

impl RebaseResult {
    /// Serializes the projected source map to JSON.
    pub fn map_json(&self) -> Result<Option<String>, RebaseError> {
        let Some(map) = &self.map else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        map.to_writer(&mut buf).map_err(RebaseError::EncodeMap)?;
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Rewrites `url(...)` references in compiled stylesheets so they resolve
/// from the stylesheet's own location.
///
/// A configured rebaser is immutable and can serve many stylesheets
/// concurrently. Rebasing must run inside a tokio runtime.
#[derive(Clone)]
pub struct Rebaser {
    map: Option<SourceMapResolver>,
    policy: Arc<dyn RebasePolicy>,
    options: RebaseOptions,
    listener: Option<UnboundedSender<RebaseRecord>>,
}

impl Default for Rebaser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Rebaser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rebaser")
            .field("map", &self.map.is_some())
            .field("options", &self.options)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Rebaser {
    /// Creates a rebaser with the default policy and no explicit source map.
    pub fn new() -> Self {
        Self {
            map: None,
            policy: Arc::new(DefaultPolicy),
            options: RebaseOptions::default(),
            listener: None,
        }
    }

    /// Uses `map` instead of any map embedded in the stylesheet.
    pub fn with_map(mut self, map: SourceMapResolver) -> Self {
        self.map = Some(map);
        self
    }

    /// Decodes and uses a source map given as JSON.
    pub fn with_map_json(self, json: &[u8]) -> Result<Self, RebaseError> {
        Ok(self.with_map(SourceMapResolver::from_slice(json)?))
    }

    /// Sets the policy deciding each rebase.
    pub fn with_policy(mut self, policy: impl RebasePolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Sets all options at once.
    pub fn with_options(mut self, options: RebaseOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables source map output.
    pub fn emit_map(mut self, emit_map: bool) -> Self {
        self.options.emit_map = emit_map;
        self
    }

    /// Makes absolute source paths relative to `base_dir`.
    pub fn base_dir(mut self, base_dir: impl Into<Utf8PathBuf>) -> Self {
        self.options.base_dir = Some(base_dir.into());
        self
    }

    /// Also sends every record to `listener` as it is applied.
    pub fn with_listener(mut self, listener: UnboundedSender<RebaseRecord>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &RebaseOptions {
        &self.options
    }

    /// Rebases every eligible `url(...)` reference in `css`.
    ///
    /// All policy decisions are started before any is awaited; they are
    /// applied in text order whatever order they complete in.
    pub async fn rebase(&self, css: &str) -> Result<RebaseResult, RebaseError> {
        let stylesheet = css_parser::parse(css).into_result()?;
        let resolver = self.resolver_for(css, &stylesheet)?;

        let index = LineIndex::new(css);
        let occurrences = locate(&stylesheet, &index, css);
        let total = occurrences.len();

        let mut pending: Vec<(AssetOccurrence, String, String, JoinHandle<_>)> = Vec::new();
        for occurrence in occurrences {
            let kind = classify(&occurrence.raw);
            if !kind.is_rebasable() {
                debug!(raw = %occurrence.raw, ?kind, "skipping reference");
                continue;
            }

            let Some(original) = resolver.resolve(occurrence.position) else {
                debug!(
                    raw = %occurrence.raw,
                    line = occurrence.position.line,
                    col = occurrence.position.col,
                    "no mapping for reference"
                );
                continue;
            };

            let source = paths::normalize_source(&original.source, self.options.base_dir.as_deref());
            let resolved = paths::resolve(&source, &occurrence.raw);
            let request = RebaseRequest {
                source: source.clone(),
                resolved: resolved.clone(),
                raw: occurrence.raw.clone(),
            };
            let handle = tokio::spawn(self.policy.decide(request));
            pending.push((occurrence, source, resolved, handle));
        }

        let mut decisions = Vec::with_capacity(pending.len());
        for (occurrence, source, resolved, handle) in pending {
            let decision = handle
                .await
                .map_err(|e| RebaseError::PolicyTask(e.to_string()))??;

            let rebased = match decision {
                Decision::Suppress => {
                    debug!(raw = %occurrence.raw, "rebase suppressed by policy");
                    continue;
                }
                Decision::Default => resolved.clone(),
                Decision::Override(path) => path,
            };
            debug!(raw = %occurrence.raw, %source, %rebased, "rebasing reference");
            decisions.push(RebaseDecision {
                occurrence,
                source,
                resolved,
                rebased,
            });
        }

        let rewritten = rewrite(css, &decisions);
        let map = self
            .options
            .emit_map
            .then(|| project(&resolver, css, &rewritten.css, &rewritten.offsets));

        if let Some(listener) = &self.listener {
            for record in &rewritten.records {
                let _ = listener.send(record.clone());
            }
        }

        info!(
            references = total,
            rebased = rewritten.records.len(),
            "rebased stylesheet"
        );

        Ok(RebaseResult {
            css: rewritten.css,
            map,
            rebases: rewritten.records,
        })
    }

    /// Picks the supplied map, falling back to one embedded as a data URL.
    fn resolver_for(
        &self,
        css: &str,
        stylesheet: &css_parser::Stylesheet,
    ) -> Result<SourceMapResolver, RebaseError> {
        if let Some(map) = &self.map {
            return Ok(map.clone());
        }

        match stylesheet.source_mapping_url(css) {
            Some(url) if url.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:")) => {
                Ok(SourceMapResolver::from_data_url(url)?)
            }
            Some(url) => {
                debug!(%url, "ignoring external source map reference");
                Err(RebaseError::MissingSourceMap)
            }
            None => Err(RebaseError::MissingSourceMap),
        }
    }
}
