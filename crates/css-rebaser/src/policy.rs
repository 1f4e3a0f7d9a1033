//! Pluggable rebase decisions.
//!
//! Every eligible reference is submitted to a [`RebasePolicy`] together with
//! the file it came from and the path it resolves to. The policy answers
//! asynchronously with a [`Decision`]:
//!
//! - [`Decision::Suppress`] leaves the reference untouched.
//! - [`Decision::Default`] rewrites it to the resolved path.
//! - [`Decision::Override`] rewrites it to a path of the policy's choosing.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors reported by a rebase policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy reported a failure.
    #[error("rebase policy failed: {0}")]
    Failed(String),

    /// A completion handle was dropped without a decision.
    #[error("rebase policy dropped its completion handle without deciding")]
    Abandoned,

    /// A configured glob pattern is invalid.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),
}

/// The outcome of a policy decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Leave the reference as written.
    Suppress,
    /// Rewrite the reference to the resolved path.
    Default,
    /// Rewrite the reference to the given path, verbatim.
    Override(String),
}

/// What a policy is asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseRequest {
    /// The original source file the reference was written in.
    pub source: String,
    /// The reference resolved against the source file's directory.
    pub resolved: String,
    /// The reference as written in the stylesheet.
    pub raw: String,
}

/// A boxed decision future.
pub type PolicyFuture = Pin<Box<dyn Future<Output = Result<Decision, PolicyError>> + Send + 'static>>;

/// Decides how each eligible reference is rewritten.
pub trait RebasePolicy: Send + Sync {
    /// Starts a decision for one reference.
    fn decide(&self, request: RebaseRequest) -> PolicyFuture;
}

impl<F, Fut> RebasePolicy for F
where
    F: Fn(RebaseRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Decision, PolicyError>> + Send + 'static,
{
    fn decide(&self, request: RebaseRequest) -> PolicyFuture {
        Box::pin(self(request))
    }
}

/// Rewrites every eligible reference to its resolved path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl RebasePolicy for DefaultPolicy {
    fn decide(&self, _request: RebaseRequest) -> PolicyFuture {
        Box::pin(std::future::ready(Ok(Decision::Default)))
    }
}

/// Completion handle passed to a [`CallbackPolicy`] callback.
///
/// Exactly one of its methods must be called, possibly later and from
/// another thread. Dropping it unused fails the rebase with
/// [`PolicyError::Abandoned`].
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<Result<Decision, PolicyError>>,
}

impl Done {
    /// Leaves the reference untouched.
    pub fn suppress(self) {
        self.finish(Ok(Decision::Suppress));
    }

    /// Rewrites the reference to the resolved path.
    pub fn accept(self) {
        self.finish(Ok(Decision::Default));
    }

    /// Rewrites the reference to `path`.
    pub fn rebase_to(self, path: impl Into<String>) {
        self.finish(Ok(Decision::Override(path.into())));
    }

    /// Fails the rebase.
    pub fn fail(self, message: impl Into<String>) {
        self.finish(Err(PolicyError::Failed(message.into())));
    }

    fn finish(self, result: Result<Decision, PolicyError>) {
        // The receiver is gone only if the rebase itself was dropped.
        let _ = self.tx.send(result);
    }
}

/// A policy driven by a callback that completes through a [`Done`] handle.
pub struct CallbackPolicy<F> {
    callback: F,
}

impl<F> CallbackPolicy<F>
where
    F: Fn(RebaseRequest, Done) + Send + Sync,
{
    /// Creates a policy from a callback.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> RebasePolicy for CallbackPolicy<F>
where
    F: Fn(RebaseRequest, Done) + Send + Sync,
{
    fn decide(&self, request: RebaseRequest) -> PolicyFuture {
        let (tx, rx) = oneshot::channel();
        (self.callback)(request, Done { tx });
        Box::pin(async move { rx.await.unwrap_or(Err(PolicyError::Abandoned)) })
    }
}

/// A prefix substitution applied to resolved paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrefixRewrite {
    /// The prefix to replace.
    pub from: String,
    /// The replacement.
    pub to: String,
}

/// A configuration-driven policy.
///
/// Resolved paths matching an exclude glob are suppressed. Otherwise the
/// first rewrite whose `from` prefixes the resolved path replaces that
/// prefix. Everything else gets the default rebase.
#[derive(Debug, Clone)]
pub struct RulesPolicy {
    exclude: GlobSet,
    rewrites: Vec<PrefixRewrite>,
}

impl RulesPolicy {
    /// Creates a policy from exclude globs and prefix rewrites.
    pub fn new<S: AsRef<str>>(
        exclude: &[S],
        rewrites: Vec<PrefixRewrite>,
    ) -> Result<Self, PolicyError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude {
            let glob =
                Glob::new(pattern.as_ref()).map_err(|e| PolicyError::InvalidGlob(e.to_string()))?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| PolicyError::InvalidGlob(e.to_string()))?;

        Ok(Self { exclude, rewrites })
    }

    /// Decides synchronously.
    pub fn decision(&self, request: &RebaseRequest) -> Decision {
        let (path, _) = crate::paths::split_suffix(&request.resolved);
        if self.exclude.is_match(path) {
            return Decision::Suppress;
        }

        self.rewrites
            .iter()
            .find_map(|rewrite| {
                request
                    .resolved
                    .strip_prefix(rewrite.from.as_str())
                    .map(|rest| Decision::Override(format!("{}{rest}", rewrite.to)))
            })
            .unwrap_or(Decision::Default)
    }
}

impl RebasePolicy for RulesPolicy {
    fn decide(&self, request: RebaseRequest) -> PolicyFuture {
        Box::pin(std::future::ready(Ok(self.decision(&request))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(resolved: &str) -> RebaseRequest {
        RebaseRequest {
            source: "src/a.scss".to_string(),
            resolved: resolved.to_string(),
            raw: "./x.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_default_policy() {
        let decision = DefaultPolicy.decide(request("src/x.png")).await.unwrap();
        assert_eq!(decision, Decision::Default);
    }

    #[tokio::test]
    async fn test_closure_policy() {
        let policy = |req: RebaseRequest| async move {
            Ok::<_, PolicyError>(Decision::Override(format!("/static/{}", req.resolved)))
        };
        let decision = policy.decide(request("src/x.png")).await.unwrap();
        assert_eq!(decision, Decision::Override("/static/src/x.png".to_string()));
    }

    #[tokio::test]
    async fn test_callback_policy_completes_later() {
        let policy = CallbackPolicy::new(|req: RebaseRequest, done: Done| {
            std::thread::spawn(move || {
                if req.resolved.ends_with(".svg") {
                    done.suppress();
                } else {
                    done.rebase_to("cdn/x.png");
                }
            });
        });

        assert_eq!(
            policy.decide(request("src/x.svg")).await.unwrap(),
            Decision::Suppress
        );
        assert_eq!(
            policy.decide(request("src/x.png")).await.unwrap(),
            Decision::Override("cdn/x.png".to_string())
        );
    }

    #[tokio::test]
    async fn test_callback_policy_abandoned() {
        let policy = CallbackPolicy::new(|_req, done: Done| drop(done));
        let err = policy.decide(request("src/x.png")).await.unwrap_err();
        assert!(matches!(err, PolicyError::Abandoned));
    }

    #[tokio::test]
    async fn test_callback_policy_failure() {
        let policy = CallbackPolicy::new(|_req, done: Done| done.fail("no such asset"));
        let err = policy.decide(request("src/x.png")).await.unwrap_err();
        assert_eq!(err.to_string(), "rebase policy failed: no such asset");
    }

    #[test]
    fn test_rules_policy() {
        let policy = RulesPolicy::new(
            &["**/*.svg", "vendor/**"],
            vec![PrefixRewrite {
                from: "src/".to_string(),
                to: "/assets/".to_string(),
            }],
        )
        .unwrap();

        assert_eq!(policy.decision(&request("src/icons/a.svg#i")), Decision::Suppress);
        assert_eq!(policy.decision(&request("vendor/x.png")), Decision::Suppress);
        assert_eq!(
            policy.decision(&request("src/img/x.png?v=2")),
            Decision::Override("/assets/img/x.png?v=2".to_string())
        );
        assert_eq!(policy.decision(&request("lib/x.png")), Decision::Default);
    }

    #[test]
    fn test_rules_policy_invalid_glob() {
        let err = RulesPolicy::new(&["a/[b"], Vec::new()).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidGlob(_)));
    }
}
